//! Route definitions for game controller coordination.
//!
//! All endpoints require authentication via the `AuthUser` extractor.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::controller;
use crate::state::AppState;

/// Controller routes mounted at `/games/{game_id}/controller`.
///
/// ```text
/// GET  /                   -> get_controller
/// POST /claim-primary      -> claim_primary
/// POST /claim-secondary    -> claim_secondary
/// POST /release            -> release
/// POST /handoff-response   -> respond_handoff
/// POST /ping               -> ping
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(controller::get_controller))
        .route("/claim-primary", post(controller::claim_primary))
        .route("/claim-secondary", post(controller::claim_secondary))
        .route("/release", post(controller::release))
        .route("/handoff-response", post(controller::respond_handoff))
        .route("/ping", post(controller::ping))
}
