//! Claim, release, and heartbeat transitions for controller leases.
//!
//! All functions here are pure with respect to time: they operate on a
//! `&mut ControllerState` with an explicit `now`, and the caller (the
//! registry) is responsible for holding the per-game lock and running
//! [`sweep`] first so stale leases and expired handoffs are never observed.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::handoff;
use crate::state::{ControllerState, PendingHandoff, Role, RoleHolder};
use crate::types::Timestamp;

/// Result of a claim attempt that did not error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The caller now holds the role (fresh claim or idempotent re-claim).
    Claimed,
    /// The role is held by someone else; a handoff negotiation is pending.
    HandoffRequested(PendingHandoff),
}

/// Clear stale leases and resolve the pending handoff if its window elapsed.
///
/// Ordering matters: stale holders are cleared first, then a handoff whose
/// role has gone vacant is dropped (the requester claims outright on their
/// next attempt), and only then is a still-live expired handoff resolved by
/// the configured timeout policy. Runs under the same per-game lock as every
/// explicit operation, so expiry resolution and a concurrent respond cannot
/// both fire.
pub fn sweep(state: &mut ControllerState, config: &ControllerConfig, now: Timestamp) {
    for role in Role::ALL {
        let slot = state.holder_slot(role);
        if slot
            .as_ref()
            .is_some_and(|holder| holder.is_stale(now, config.stale_timeout))
        {
            *slot = None;
        }
    }

    let Some(pending) = state.pending_handoff.as_ref() else {
        return;
    };

    // The holder's lease was reclaimed independently of the negotiation:
    // the role is now vacant, so the negotiation is moot.
    if state.holder(pending.role).is_none() {
        state.pending_handoff = None;
        return;
    }

    if pending.is_expired(now) {
        handoff::resolve_expired(state, config.timeout_policy, now);
    }
}

/// Attempt to claim `role` for the caller.
///
/// - Vacant role: the caller becomes the holder.
/// - Already held by the caller: the heartbeat is refreshed (idempotent).
/// - Held by someone else: delegates to the handoff engine.
pub fn claim(
    state: &mut ControllerState,
    role: Role,
    user_id: &str,
    display_name: &str,
    config: &ControllerConfig,
    now: Timestamp,
) -> Result<ClaimOutcome, ControllerError> {
    match state.holder(role) {
        Some(holder) if holder.user_id == user_id => {
            // `holder()` returned Some for this role, so the slot is Some.
            if let Some(holder) = state.holder_mut(role) {
                holder.last_heartbeat = now;
            }
            Ok(ClaimOutcome::Claimed)
        }
        Some(_) => handoff::request(state, role, user_id, display_name, config, now)
            .map(ClaimOutcome::HandoffRequested),
        None => {
            *state.holder_slot(role) = Some(RoleHolder::new(user_id, display_name, now));
            Ok(ClaimOutcome::Claimed)
        }
    }
}

/// Release `role`, which the caller must currently hold.
///
/// A pending handoff for the released role is invalidated rather than
/// auto-granted: the requester must re-claim against the now-vacant role, so
/// an abandoned negotiation cannot silently fire later.
pub fn release(
    state: &mut ControllerState,
    role: Role,
    user_id: &str,
) -> Result<(), ControllerError> {
    let holds = state
        .holder(role)
        .is_some_and(|holder| holder.user_id == user_id);
    if !holds {
        return Err(ControllerError::NotHolder { role });
    }

    *state.holder_slot(role) = None;

    if state
        .pending_handoff
        .as_ref()
        .is_some_and(|pending| pending.role == role)
    {
        state.pending_handoff = None;
    }

    Ok(())
}

/// Refresh the heartbeat on every role the caller holds.
///
/// Holding nothing is a no-op, not an error. Returns the roles refreshed.
pub fn heartbeat(state: &mut ControllerState, user_id: &str, now: Timestamp) -> Vec<Role> {
    let mut pinged = Vec::new();
    for role in Role::ALL {
        if let Some(holder) = state.holder_mut(role) {
            if holder.user_id == user_id {
                holder.last_heartbeat = now;
                pinged.push(role);
            }
        }
    }
    pinged
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn config() -> ControllerConfig {
        ControllerConfig::default()
    }

    fn claimed_by(
        state: &mut ControllerState,
        role: Role,
        user_id: &str,
        name: &str,
        now: Timestamp,
    ) {
        let outcome = claim(state, role, user_id, name, &config(), now).unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);
    }

    // -----------------------------------------------------------------------
    // Claim
    // -----------------------------------------------------------------------

    #[test]
    fn test_claim_vacant_role() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        let holder = state.primary_holder.as_ref().unwrap();
        assert_eq!(holder.user_id, "user-alice");
        assert_eq!(holder.display_name, "Alice");
        assert_eq!(holder.claimed_at, now);
        assert!(state.secondary_holder.is_none());
    }

    #[test]
    fn test_two_users_hold_different_roles() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Secondary, "user-bob", "Bob", now);

        assert_eq!(state.primary_holder.as_ref().unwrap().user_id, "user-alice");
        assert_eq!(state.secondary_holder.as_ref().unwrap().user_id, "user-bob");
    }

    #[test]
    fn test_reclaim_refreshes_heartbeat_only() {
        let now = Utc::now();
        let later = now + Duration::seconds(3);
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", later);

        let holder = state.primary_holder.as_ref().unwrap();
        assert_eq!(holder.last_heartbeat, later);
        // Nothing but the heartbeat timestamp changed.
        assert_eq!(holder.claimed_at, now);
        assert!(state.pending_handoff.is_none());
    }

    #[test]
    fn test_claim_occupied_role_opens_handoff() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        let outcome = claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();
        let pending = assert_matches!(outcome, ClaimOutcome::HandoffRequested(p) => p);
        assert_eq!(pending.requester_id, "user-bob");
        assert_eq!(pending.current_holder_id, "user-alice");
        assert_eq!(pending.expires_at, now + config().handoff_window);
        // Alice still holds the role while the negotiation is open.
        assert_eq!(state.primary_holder.as_ref().unwrap().user_id, "user-alice");
    }

    #[test]
    fn test_repeat_claim_returns_existing_handoff() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        let first = claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();

        // Bob's poll loop claims again before Alice responds.
        let second = claim(
            &mut state,
            Role::Primary,
            "user-bob",
            "Bob",
            &config(),
            now + Duration::seconds(2),
        )
        .unwrap();

        assert_eq!(second, first);
    }

    #[test]
    fn test_claim_while_other_requester_pending_fails() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();

        let err = claim(
            &mut state,
            Role::Primary,
            "user-carol",
            "Carol",
            &config(),
            now,
        )
        .unwrap_err();
        assert_matches!(
            err,
            ControllerError::HandoffAlreadyPending { requester_id } if requester_id == "user-bob"
        );
    }

    // -----------------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------------

    #[test]
    fn test_release_vacates_role() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        release(&mut state, Role::Primary, "user-alice").unwrap();

        assert!(state.primary_holder.is_none());
    }

    #[test]
    fn test_release_leaves_other_role_intact() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        // Alice holds both roles; releasing one must not touch the other.
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Secondary, "user-alice", "Alice", now);

        release(&mut state, Role::Primary, "user-alice").unwrap();

        assert!(state.primary_holder.is_none());
        assert_eq!(
            state.secondary_holder.as_ref().unwrap().user_id,
            "user-alice"
        );
    }

    #[test]
    fn test_release_by_non_holder_fails() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        let err = release(&mut state, Role::Primary, "user-bob").unwrap_err();
        assert_eq!(err, ControllerError::NotHolder { role: Role::Primary });
        assert!(state.primary_holder.is_some());
    }

    #[test]
    fn test_release_of_vacant_role_fails() {
        let mut state = ControllerState::default();
        let err = release(&mut state, Role::Primary, "user-alice").unwrap_err();
        assert_eq!(err, ControllerError::NotHolder { role: Role::Primary });
    }

    #[test]
    fn test_release_invalidates_pending_handoff_for_role() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();

        release(&mut state, Role::Primary, "user-alice").unwrap();

        // The requester re-claims against the vacant role instead of being
        // auto-granted by an abandoned negotiation.
        assert!(state.pending_handoff.is_none());
        assert!(state.primary_holder.is_none());
    }

    #[test]
    fn test_release_keeps_handoff_for_other_role() {
        let now = Utc::now();
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Secondary, "user-alice", "Alice", now);
        claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();

        release(&mut state, Role::Secondary, "user-alice").unwrap();

        assert!(state.pending_handoff.is_some());
    }

    // -----------------------------------------------------------------------
    // Heartbeat
    // -----------------------------------------------------------------------

    #[test]
    fn test_heartbeat_refreshes_all_held_roles() {
        let now = Utc::now();
        let later = now + Duration::seconds(4);
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Secondary, "user-alice", "Alice", now);

        let pinged = heartbeat(&mut state, "user-alice", later);

        assert_eq!(pinged, vec![Role::Primary, Role::Secondary]);
        assert_eq!(state.primary_holder.as_ref().unwrap().last_heartbeat, later);
        assert_eq!(
            state.secondary_holder.as_ref().unwrap().last_heartbeat,
            later
        );
    }

    #[test]
    fn test_heartbeat_skips_roles_held_by_others() {
        let now = Utc::now();
        let later = now + Duration::seconds(4);
        let mut state = ControllerState::default();

        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claimed_by(&mut state, Role::Secondary, "user-bob", "Bob", now);

        let pinged = heartbeat(&mut state, "user-alice", later);

        assert_eq!(pinged, vec![Role::Primary]);
        assert_eq!(state.secondary_holder.as_ref().unwrap().last_heartbeat, now);
    }

    #[test]
    fn test_heartbeat_with_no_roles_is_noop() {
        let mut state = ControllerState::default();
        let pinged = heartbeat(&mut state, "user-alice", Utc::now());
        assert!(pinged.is_empty());
    }

    // -----------------------------------------------------------------------
    // Sweep: staleness
    // -----------------------------------------------------------------------

    #[test]
    fn test_sweep_clears_stale_holder() {
        let now = Utc::now();
        let mut state = ControllerState::default();
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        let past_timeout = now + config().stale_timeout + Duration::seconds(1);
        sweep(&mut state, &config(), past_timeout);

        assert!(state.primary_holder.is_none());
    }

    #[test]
    fn test_sweep_keeps_live_holder_until_strictly_past_timeout() {
        let now = Utc::now();
        let mut state = ControllerState::default();
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        sweep(&mut state, &config(), now + config().stale_timeout);

        assert!(state.primary_holder.is_some());
    }

    #[test]
    fn test_stale_role_claimable_by_other_user() {
        let now = Utc::now();
        let mut state = ControllerState::default();
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);

        let later = now + config().stale_timeout + Duration::seconds(1);
        sweep(&mut state, &config(), later);
        let outcome =
            claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), later).unwrap();

        // Direct claim, no handoff: the stale lease was already reclaimed.
        assert_eq!(outcome, ClaimOutcome::Claimed);
        assert_eq!(state.primary_holder.as_ref().unwrap().user_id, "user-bob");
    }

    #[test]
    fn test_sweep_drops_handoff_when_holder_went_stale() {
        let now = Utc::now();
        let mut state = ControllerState::default();
        claimed_by(&mut state, Role::Primary, "user-alice", "Alice", now);
        claim(&mut state, Role::Primary, "user-bob", "Bob", &config(), now).unwrap();

        // Alice goes silent past the stale timeout while Bob's request is
        // still nominally pending. The role is vacated and the negotiation
        // dropped; Bob's next claim succeeds outright.
        let later = now + config().stale_timeout + Duration::seconds(1);
        sweep(&mut state, &config(), later);

        assert!(state.primary_holder.is_none());
        assert!(state.pending_handoff.is_none());
    }
}
