//! Handoff negotiation: request, respond, and timeout resolution.
//!
//! A negotiation moves `NoHandoff -> Pending -> {accepted, denied, expired}`
//! and immediately collapses back to `NoHandoff` (with the requester as the
//! new holder when accepted). Only one negotiation per game is ever in
//! flight, regardless of role.

use crate::config::{ControllerConfig, HandoffTimeoutPolicy};
use crate::error::ControllerError;
use crate::state::{ControllerState, PendingHandoff, Role, RoleHolder};
use crate::types::Timestamp;

/// How a negotiation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffResolution {
    /// The role transferred to the requester.
    Accepted,
    /// The current holder kept the role.
    Denied,
}

/// Open a negotiation for `role`, currently held by someone else.
///
/// Re-requesting while the caller's own negotiation for the same role is
/// pending returns the existing handoff unchanged; a second requester gets
/// [`ControllerError::HandoffAlreadyPending`].
pub fn request(
    state: &mut ControllerState,
    role: Role,
    requester_id: &str,
    requester_name: &str,
    config: &ControllerConfig,
    now: Timestamp,
) -> Result<PendingHandoff, ControllerError> {
    let Some(holder) = state.holder(role) else {
        return Err(ControllerError::RoleVacant { role });
    };

    if holder.user_id == requester_id {
        return Err(ControllerError::AlreadyHolder { role });
    }
    let current_holder_id = holder.user_id.clone();

    if let Some(pending) = state.pending_handoff.as_ref() {
        if pending.role == role && pending.requester_id == requester_id {
            return Ok(pending.clone());
        }
        return Err(ControllerError::HandoffAlreadyPending {
            requester_id: pending.requester_id.clone(),
        });
    }

    let handoff = PendingHandoff {
        role,
        requester_id: requester_id.to_string(),
        requester_name: requester_name.to_string(),
        current_holder_id,
        requested_at: now,
        expires_at: now + config.handoff_window,
    };
    state.pending_handoff = Some(handoff.clone());
    Ok(handoff)
}

/// Resolve the pending negotiation as its current holder.
///
/// Only the holder named by the handoff may respond; the requester cannot
/// accept their own request. Accepting replaces the role's holder with a
/// fresh lease for the requester. Returns the resolution together with the
/// consumed handoff.
pub fn respond(
    state: &mut ControllerState,
    user_id: &str,
    accept: bool,
    now: Timestamp,
) -> Result<(HandoffResolution, PendingHandoff), ControllerError> {
    match state.pending_handoff.as_ref() {
        None => return Err(ControllerError::NoPendingHandoff),
        Some(pending) if pending.current_holder_id != user_id => {
            return Err(ControllerError::NotHolder { role: pending.role });
        }
        Some(_) => {}
    }

    // Take the handoff out; the negotiation is over either way.
    let Some(pending) = state.pending_handoff.take() else {
        return Err(ControllerError::NoPendingHandoff);
    };

    if accept {
        transfer(state, &pending, now);
        Ok((HandoffResolution::Accepted, pending))
    } else {
        Ok((HandoffResolution::Denied, pending))
    }
}

/// Apply the configured timeout policy to an expired negotiation.
///
/// Called from the sweep under the per-game lock; the handoff is known to be
/// expired and its role known to still have a live holder.
pub(crate) fn resolve_expired(
    state: &mut ControllerState,
    policy: HandoffTimeoutPolicy,
    now: Timestamp,
) {
    let Some(pending) = state.pending_handoff.take() else {
        return;
    };

    match policy {
        HandoffTimeoutPolicy::AutoAccept => transfer(state, &pending, now),
        HandoffTimeoutPolicy::AutoDeny => {}
    }
}

/// Replace the role's holder with a fresh lease for the requester.
fn transfer(state: &mut ControllerState, pending: &PendingHandoff, now: Timestamp) {
    *state.holder_slot(pending.role) = Some(RoleHolder::new(
        pending.requester_id.clone(),
        pending.requester_name.clone(),
        now,
    ));
}
