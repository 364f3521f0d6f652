//! Controller state types: roles, role holders, and pending handoffs.
//!
//! These are the wire shapes too (serialized camelCase into API payloads),
//! so the server and the polling client always agree on structure.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

/// The two independently-leased controller roles a game supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Write access to the live event stream (the active coach).
    Primary,
    /// Write access to the between-points preparation buffer (the line coach).
    Secondary,
}

impl Role {
    /// Both roles, in a fixed order (primary first).
    pub const ALL: [Role; 2] = [Role::Primary, Role::Secondary];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live lease on a controller role.
///
/// Created on a successful claim or handoff acceptance, refreshed by every
/// heartbeat, and destroyed by release, handoff transfer, or stale
/// reclamation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleHolder {
    pub user_id: UserId,
    pub display_name: String,
    pub claimed_at: Timestamp,
    pub last_heartbeat: Timestamp,
}

impl RoleHolder {
    /// A fresh lease claimed at `now`.
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            claimed_at: now,
            last_heartbeat: now,
        }
    }

    /// Whether this lease has gone silent for longer than `stale_timeout`.
    ///
    /// A stale holder is treated as absent by every read and claim; the
    /// strict inequality means a lease is still live at exactly the timeout.
    pub fn is_stale(&self, now: Timestamp, stale_timeout: Duration) -> bool {
        now - self.last_heartbeat > stale_timeout
    }
}

/// A time-bounded negotiation for taking over a held role.
///
/// At most one exists per game at any time, across both roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingHandoff {
    pub role: Role,
    pub requester_id: UserId,
    pub requester_name: String,
    pub current_holder_id: UserId,
    pub requested_at: Timestamp,
    pub expires_at: Timestamp,
}

impl PendingHandoff {
    /// Whether the negotiation window has elapsed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// Authoritative controller state for one game.
///
/// The zero value (`Default`) is the state of every game nobody has touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerState {
    pub primary_holder: Option<RoleHolder>,
    pub secondary_holder: Option<RoleHolder>,
    pub pending_handoff: Option<PendingHandoff>,
}

impl ControllerState {
    pub fn holder(&self, role: Role) -> Option<&RoleHolder> {
        match role {
            Role::Primary => self.primary_holder.as_ref(),
            Role::Secondary => self.secondary_holder.as_ref(),
        }
    }

    pub fn holder_mut(&mut self, role: Role) -> Option<&mut RoleHolder> {
        self.holder_slot(role).as_mut()
    }

    /// The storage slot for a role's holder.
    pub(crate) fn holder_slot(&mut self, role: Role) -> &mut Option<RoleHolder> {
        match role {
            Role::Primary => &mut self.primary_holder,
            Role::Secondary => &mut self.secondary_holder,
        }
    }

    /// Every role currently held by `user_id`, in [`Role::ALL`] order.
    ///
    /// A caller may hold both roles simultaneously; they are independent
    /// leases.
    pub fn roles_held_by(&self, user_id: &str) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| {
                self.holder(*role)
                    .is_some_and(|holder| holder.user_id == user_id)
            })
            .collect()
    }

    /// Whether a pending handoff is waiting on a response from `user_id`.
    pub fn has_pending_handoff_for(&self, user_id: &str) -> bool {
        self.pending_handoff
            .as_ref()
            .is_some_and(|handoff| handoff.current_holder_id == user_id)
    }

    /// True when no leases and no negotiation exist (the zero value).
    pub fn is_empty(&self) -> bool {
        self.primary_holder.is_none()
            && self.secondary_holder.is_none()
            && self.pending_handoff.is_none()
    }
}
