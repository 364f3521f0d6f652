//! Observation snapshots and the pure diff between them.
//!
//! The poller cannot see server-side transitions directly (stale leases and
//! expired handoffs resolve lazily, inside someone's request). It detects
//! them by comparing consecutive observations of the same game.

use fieldsync_core::{ControllerState, PendingHandoff, Role};

/// One observation of a game's controller state from the caller's point of
/// view.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The roles the caller held at observation time.
    pub my_roles: Vec<Role>,
    /// Whether a pending handoff awaited the caller's response.
    pub has_pending_handoff_for_me: bool,
    /// The full controller state as observed.
    pub state: ControllerState,
}

impl Snapshot {
    /// Derive the caller's view from a raw controller state.
    pub fn observe(state: ControllerState, user_id: &str) -> Self {
        Self {
            my_roles: state.roles_held_by(user_id),
            has_pending_handoff_for_me: state.has_pending_handoff_for(user_id),
            state,
        }
    }

    /// Whether the caller held at least one role at observation time.
    pub fn holds_any_role(&self) -> bool {
        !self.my_roles.is_empty()
    }
}

/// A state transition worth surfacing to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerNotification {
    /// The set of roles the caller holds changed since the last observation.
    ///
    /// Covers grants (handoff accepted or auto-resolved in the caller's
    /// favor) and losses (lease expired, handoff accepted away, admin
    /// clear).
    RoleChanged {
        previous: Vec<Role>,
        current: Vec<Role>,
    },

    /// A handoff request now awaits the caller's response.
    ///
    /// Emitted once per negotiation, on the edge where "a handoff is
    /// pending for me" flips from false to true.
    HandoffPending { handoff: PendingHandoff },
}

/// Compare two consecutive observations and produce notifications.
///
/// `previous` of `None` is the first observation and is treated as "held
/// nothing, no pending handoff", so joining a game where the caller already
/// holds a role still notifies.
pub fn diff(previous: Option<&Snapshot>, current: &Snapshot) -> Vec<ControllerNotification> {
    let mut notifications = Vec::new();

    let previous_roles: &[Role] = previous.map(|s| s.my_roles.as_slice()).unwrap_or(&[]);
    if previous_roles != current.my_roles.as_slice() {
        notifications.push(ControllerNotification::RoleChanged {
            previous: previous_roles.to_vec(),
            current: current.my_roles.clone(),
        });
    }

    let was_pending = previous.is_some_and(|s| s.has_pending_handoff_for_me);
    if !was_pending && current.has_pending_handoff_for_me {
        if let Some(handoff) = &current.state.pending_handoff {
            notifications.push(ControllerNotification::HandoffPending {
                handoff: handoff.clone(),
            });
        }
    }

    notifications
}
