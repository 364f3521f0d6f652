//! Handlers for game controller coordination: role leases and handoffs.
//!
//! The registry is the single source of truth; every handler passes
//! `Utc::now()` down so staleness and handoff expiry are evaluated lazily on
//! each request. Clients converge by polling the query endpoint (or `ping`,
//! which doubles as the heartbeat).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use fieldsync_core::handoff::HandoffResolution;
use fieldsync_core::protocol::{
    ClaimResponse, ClaimStatus, HandoffRespondResponse, HandoffResponseRequest, PingResponse,
    ReleaseRequest, ReleaseResponse, StateQueryResponse,
};
use fieldsync_core::{ClaimOutcome, Role};
use fieldsync_events::ControllerEvent;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/games/{game_id}/controller
///
/// Current controller state plus the caller's view of it. Never fails for
/// unseen games; they read as empty. Every read is self-healing (stale
/// leases and expired handoffs are resolved before the snapshot is taken).
pub async fn get_controller(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let controller = state.registry.get(&game_id, now);

    Ok(Json(StateQueryResponse {
        my_roles: controller.roles_held_by(&caller.user_id),
        has_pending_handoff_for_me: controller.has_pending_handoff_for(&caller.user_id),
        state: controller,
        server_time: now,
    }))
}

/// POST /api/v1/games/{game_id}/controller/claim-primary
pub async fn claim_primary(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    claim_role(caller, state, game_id, Role::Primary).await
}

/// POST /api/v1/games/{game_id}/controller/claim-secondary
pub async fn claim_secondary(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    claim_role(caller, state, game_id, Role::Secondary).await
}

/// Claim `role`, or open a handoff negotiation when it is held by another
/// coach.
async fn claim_role(
    caller: AuthUser,
    state: AppState,
    game_id: String,
    role: Role,
) -> AppResult<Json<ClaimResponse>> {
    let now = Utc::now();
    let (outcome, controller) = state.registry.claim(
        &game_id,
        role,
        &caller.user_id,
        &caller.display_name,
        now,
    )?;

    let status = match outcome {
        ClaimOutcome::Claimed => {
            tracing::info!(user_id = %caller.user_id, %game_id, %role, "Role claimed");
            state.event_bus.publish(ControllerEvent::RoleClaimed {
                game_id: game_id.clone(),
                role,
                user_id: caller.user_id.clone(),
                display_name: caller.display_name.clone(),
                timestamp: now,
            });
            ClaimStatus::Claimed
        }
        ClaimOutcome::HandoffRequested(handoff) => {
            tracing::info!(
                user_id = %caller.user_id,
                %game_id,
                %role,
                current_holder_id = %handoff.current_holder_id,
                "Handoff requested"
            );
            state.event_bus.publish(ControllerEvent::HandoffRequested {
                game_id: game_id.clone(),
                role,
                requester_id: handoff.requester_id.clone(),
                current_holder_id: handoff.current_holder_id.clone(),
                expires_at: handoff.expires_at,
                timestamp: now,
            });
            ClaimStatus::HandoffRequested
        }
    };

    Ok(Json(ClaimResponse {
        status,
        state: controller,
    }))
}

/// POST /api/v1/games/{game_id}/controller/release
///
/// Release a held role. Only the holder can release; a pending handoff for
/// the role is invalidated rather than auto-granted.
pub async fn release(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(input): Json<ReleaseRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let controller = state
        .registry
        .release(&game_id, input.role, &caller.user_id, now)?;

    tracing::info!(user_id = %caller.user_id, %game_id, role = %input.role, "Role released");
    state.event_bus.publish(ControllerEvent::RoleReleased {
        game_id,
        role: input.role,
        user_id: caller.user_id,
        timestamp: now,
    });

    Ok(Json(ReleaseResponse {
        status: "released".into(),
        state: controller,
    }))
}

/// POST /api/v1/games/{game_id}/controller/handoff-response
///
/// Accept or deny the pending handoff. Only the current holder of the
/// contested role may respond; a negotiation that already expired reads as
/// `NO_PENDING_HANDOFF`.
pub async fn respond_handoff(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(input): Json<HandoffResponseRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let (resolution, handoff, controller) =
        state
            .registry
            .respond(&game_id, &caller.user_id, input.accept, now)?;

    let status = match resolution {
        HandoffResolution::Accepted => {
            tracing::info!(
                %game_id,
                role = %handoff.role,
                from_user_id = %caller.user_id,
                to_user_id = %handoff.requester_id,
                "Handoff accepted"
            );
            state.event_bus.publish(ControllerEvent::RoleTransferred {
                game_id,
                role: handoff.role,
                from_user_id: caller.user_id,
                to_user_id: handoff.requester_id,
                timestamp: now,
            });
            "accepted"
        }
        HandoffResolution::Denied => {
            tracing::info!(
                %game_id,
                role = %handoff.role,
                requester_id = %handoff.requester_id,
                "Handoff denied"
            );
            state.event_bus.publish(ControllerEvent::HandoffDenied {
                game_id,
                role: handoff.role,
                requester_id: handoff.requester_id,
                timestamp: now,
            });
            "denied"
        }
    };

    Ok(Json(HandoffRespondResponse {
        status: status.into(),
        state: controller,
    }))
}

/// POST /api/v1/games/{game_id}/controller/ping
///
/// Heartbeat-and-poll in one round trip: refreshes the caller's leases and
/// returns a fresh snapshot. Holding nothing is an idempotent no-op.
pub async fn ping(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let (pinged, controller) = state.registry.heartbeat(&game_id, &caller.user_id, now);

    tracing::debug!(user_id = %caller.user_id, %game_id, ?pinged, "Heartbeat");

    Ok(Json(PingResponse {
        status: "ok".into(),
        pinged,
        controller_state: controller,
        server_time: now,
    }))
}
