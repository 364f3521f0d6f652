//! Background polling loop: observe, diff, notify, heartbeat.
//!
//! One poller per (caller, game). While the caller holds a role, each cycle
//! uses `ping` so the poll doubles as the lease heartbeat; otherwise it uses
//! the read-only query endpoint. Notifications from [`crate::snapshot::diff`]
//! go out over an unbounded channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{ClientError, ControllerApi};
use crate::snapshot::{diff, ControllerNotification, Snapshot};

/// Poll cadence while the caller holds at least one role. Well inside the
/// server's 30s lease timeout.
pub const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll cadence while the caller holds nothing.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls one game on behalf of one caller and emits state-change
/// notifications.
pub struct ControllerPoller {
    api: Arc<dyn ControllerApi>,
    game_id: String,
    user_id: String,
    notifications: mpsc::UnboundedSender<ControllerNotification>,
    last: Option<Snapshot>,
}

/// Handle to a spawned poller task.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the polling loop and wait for the task to finish.
    ///
    /// Purely local: held roles stay held server-side until their lease
    /// times out or the caller releases them explicitly.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

impl ControllerPoller {
    /// Create a poller and the receiving end of its notification channel.
    pub fn new(
        api: Arc<dyn ControllerApi>,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                game_id: game_id.into(),
                user_id: user_id.into(),
                notifications: tx,
                last: None,
            },
            rx,
        )
    }

    /// The caller's latest observation, if any cycle has succeeded yet.
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    /// The delay before the next cycle, based on the last observation.
    pub fn poll_interval(&self) -> Duration {
        if self.last.as_ref().is_some_and(Snapshot::holds_any_role) {
            ACTIVE_POLL_INTERVAL
        } else {
            IDLE_POLL_INTERVAL
        }
    }

    /// Run one observe-diff-notify cycle.
    ///
    /// Failures leave the last snapshot untouched so a transient outage
    /// never reads as a role change.
    pub async fn poll_once(&mut self) -> Result<(), ClientError> {
        let state = if self.last.as_ref().is_some_and(Snapshot::holds_any_role) {
            self.api.ping(&self.game_id).await?.controller_state
        } else {
            self.api.fetch_state(&self.game_id).await?.state
        };

        let snapshot = Snapshot::observe(state, &self.user_id);
        for notification in diff(self.last.as_ref(), &snapshot) {
            tracing::debug!(game_id = %self.game_id, ?notification, "Controller state changed");
            // A dropped receiver only means nobody is listening anymore.
            let _ = self.notifications.send(notification);
        }
        self.last = Some(snapshot);
        Ok(())
    }

    /// Run the polling loop until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(game_id = %self.game_id, user_id = %self.user_id, "Poller started");

        loop {
            if let Err(e) = self.poll_once().await {
                if e.is_transient() {
                    tracing::warn!(game_id = %self.game_id, error = %e, "Poll failed, will retry");
                } else {
                    tracing::error!(game_id = %self.game_id, error = %e, "Poll rejected");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(game_id = %self.game_id, "Poller stopped");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval()) => {}
            }
        }
    }

    /// Spawn the polling loop on its own task.
    pub fn spawn(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        PollerHandle { cancel, task }
    }
}
