//! Controller timing constants and configuration.

use chrono::Duration;

/// A lease expires if no heartbeat arrives within this many seconds.
pub const DEFAULT_STALE_TIMEOUT_SECS: i64 = 30;

/// A pending handoff resolves automatically after this many seconds.
pub const DEFAULT_HANDOFF_WINDOW_SECS: i64 = 5;

/// What happens when a handoff negotiation window elapses without an
/// explicit response from the current holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffTimeoutPolicy {
    /// The unresponsive holder loses the role; the requester takes over.
    AutoAccept,
    /// The request lapses; the current holder keeps the role.
    AutoDeny,
}

impl HandoffTimeoutPolicy {
    /// Parse a policy name as used in configuration (`auto_accept` /
    /// `auto_deny`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "auto_accept" => Some(Self::AutoAccept),
            "auto_deny" => Some(Self::AutoDeny),
            _ => None,
        }
    }
}

/// Timing and policy knobs for one [`ControllerRegistry`].
///
/// [`ControllerRegistry`]: crate::registry::ControllerRegistry
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long a holder may go silent before the lease is reclaimable.
    pub stale_timeout: Duration,
    /// How long a handoff negotiation stays open.
    pub handoff_window: Duration,
    /// Resolution applied when the negotiation window elapses.
    pub timeout_policy: HandoffTimeoutPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            stale_timeout: Duration::seconds(DEFAULT_STALE_TIMEOUT_SECS),
            handoff_window: Duration::seconds(DEFAULT_HANDOFF_WINDOW_SECS),
            timeout_policy: HandoffTimeoutPolicy::AutoAccept,
        }
    }
}
