//! Route definitions for the admin/monitoring surface.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin/controller`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games", get(admin::list_active_games))
        .route("/games/{game_id}", delete(admin::clear_game))
}
