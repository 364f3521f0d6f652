use crate::state::Role;

/// Expected, recoverable failures of controller operations.
///
/// None of these corrupt registry state; callers surface them to the user
/// and keep polling. Anything that would indicate a broken invariant (for
/// example a poisoned per-game lock) panics instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// A handoff was requested for a role nobody currently holds. The caller
    /// should claim the role directly instead.
    #[error("Role '{role}' has no current holder; claim it directly")]
    RoleVacant { role: Role },

    /// The caller attempted an action reserved for the current holder.
    #[error("Caller does not hold role '{role}'")]
    NotHolder { role: Role },

    /// The requester already holds the role they asked to take over.
    #[error("Requester already holds role '{role}'")]
    AlreadyHolder { role: Role },

    /// A handoff negotiation is already in flight for this game. Only one
    /// negotiation per game at a time, regardless of role.
    #[error("A handoff is already pending for this game (requested by {requester_id})")]
    HandoffAlreadyPending { requester_id: String },

    /// A response was submitted but no handoff is pending.
    #[error("No handoff is pending for this game")]
    NoPendingHandoff,
}
