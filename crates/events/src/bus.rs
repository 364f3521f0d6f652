//! Event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the in-process publish/subscribe hub for
//! [`ControllerEvent`]s. API handlers publish after every explicit state
//! change; the embedding application subscribes via `Arc<EventBus>` to drive
//! toasts, audit trails, or anything else that wants to observe role
//! movement without polling.
//!
//! Lazily-resolved transitions (stale reclamation, handoff expiry) do not
//! publish here; clients observe those through poll diffs, which is the
//! convergence contract anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use fieldsync_core::types::{GameId, UserId};
use fieldsync_core::Role;

/// A controller state change caused by an explicit caller action.
///
/// Serialized with an internally-tagged `"type"` discriminator so a consumer
/// can route by type string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControllerEvent {
    /// A role was claimed (fresh claim or idempotent re-claim by its holder).
    #[serde(rename = "role.claimed")]
    RoleClaimed {
        game_id: GameId,
        role: Role,
        user_id: UserId,
        display_name: String,
        timestamp: DateTime<Utc>,
    },

    /// A holder released their role.
    #[serde(rename = "role.released")]
    RoleReleased {
        game_id: GameId,
        role: Role,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// A handoff was accepted and the role changed hands.
    #[serde(rename = "role.transferred")]
    RoleTransferred {
        game_id: GameId,
        role: Role,
        from_user_id: UserId,
        to_user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// A requester opened a handoff negotiation against a held role.
    #[serde(rename = "handoff.requested")]
    HandoffRequested {
        game_id: GameId,
        role: Role,
        requester_id: UserId,
        current_holder_id: UserId,
        expires_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// The current holder denied a handoff request.
    #[serde(rename = "handoff.denied")]
    HandoffDenied {
        game_id: GameId,
        role: Role,
        requester_id: UserId,
        timestamp: DateTime<Utc>,
    },
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for [`ControllerEvent`]s.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers independently
/// receive every published event.
pub struct EventBus {
    sender: broadcast::Sender<ControllerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; the registry is
    /// the source of truth, the bus is purely advisory.
    pub fn publish(&self, event: ControllerEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ControllerEvent::RoleClaimed {
            game_id: "game-1".into(),
            role: Role::Primary,
            user_id: "user-alice".into(),
            display_name: "Alice".into(),
            timestamp: Utc::now(),
        });

        let received = rx.recv().await.expect("should receive the event");
        match received {
            ControllerEvent::RoleClaimed { game_id, role, user_id, .. } => {
                assert_eq!(game_id, "game-1");
                assert_eq!(role, Role::Primary);
                assert_eq!(user_id, "user-alice");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ControllerEvent::RoleReleased {
            game_id: "game-1".into(),
            role: Role::Secondary,
            user_id: "user-bob".into(),
            timestamp: Utc::now(),
        });

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(ControllerEvent::HandoffDenied {
            game_id: "game-1".into(),
            role: Role::Primary,
            requester_id: "user-bob".into(),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = ControllerEvent::HandoffRequested {
            game_id: "game-1".into(),
            role: Role::Primary,
            requester_id: "user-bob".into(),
            current_holder_id: "user-alice".into(),
            expires_at: Utc::now(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"handoff.requested""#));

        let decoded: ControllerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }
}
