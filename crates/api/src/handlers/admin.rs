//! Admin handlers: registry monitoring and game teardown.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use fieldsync_core::ControllerState;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Payload of the active-games listing.
#[derive(Debug, Serialize)]
pub struct ActiveGamesResponse {
    /// Game id to swept controller state, sorted by id for stable output.
    pub games: BTreeMap<String, ControllerState>,
}

/// GET /api/v1/admin/controller/games
///
/// Every game with tracked controller state, swept. For monitoring and
/// debugging.
pub async fn list_active_games(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let games: BTreeMap<String, ControllerState> =
        state.registry.active_games(Utc::now()).into_iter().collect();

    Ok(Json(DataResponse {
        data: ActiveGamesResponse { games },
    }))
}

/// DELETE /api/v1/admin/controller/games/{game_id}
///
/// Drop a game's controller state entirely (the game ended). Participants'
/// next reads see the empty state and may re-claim.
pub async fn clear_game(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let cleared = state.registry.clear(&game_id);

    if cleared {
        tracing::info!(user_id = %caller.user_id, %game_id, "Controller state cleared");
    }

    Ok(Json(DataResponse {
        data: serde_json::json!({ "cleared": cleared }),
    }))
}
