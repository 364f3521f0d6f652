pub mod admin;
pub mod controller;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /games/{game_id}/controller                    query state
/// /games/{game_id}/controller/claim-primary      claim live-event role
/// /games/{game_id}/controller/claim-secondary    claim line-prep role
/// /games/{game_id}/controller/release            release a held role
/// /games/{game_id}/controller/handoff-response   accept/deny pending handoff
/// /games/{game_id}/controller/ping               heartbeat + snapshot
///
/// /admin/controller/games                        list tracked games
/// /admin/controller/games/{game_id}              clear game state (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/games/{game_id}/controller", controller::router())
        .nest("/admin/controller", admin::router())
}
