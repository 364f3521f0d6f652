//! Periodic reaping of idle game entries.
//!
//! The lazy sweep on every read already hides stale leases and expired
//! handoffs, so correctness never depends on this task. What it does bound
//! is memory: over a long season thousands of finished games would otherwise
//! leave empty entries in the registry map. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use fieldsync_core::ControllerRegistry;

/// Default idle retention: entries empty and untouched this long are dropped.
const DEFAULT_IDLE_RETENTION_MINS: i64 = 60;

/// How often the reaper runs.
const REAP_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Run the idle-game reap loop.
///
/// Drops registry entries whose state is empty and which nobody has touched
/// for `IDLE_GAME_RETENTION_MINS` (defaults to 60). Runs until `cancel` is
/// triggered.
pub async fn run(registry: Arc<ControllerRegistry>, cancel: CancellationToken) {
    let retention_mins: i64 = std::env::var("IDLE_GAME_RETENTION_MINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_IDLE_RETENTION_MINS);

    tracing::info!(
        retention_mins,
        interval_secs = REAP_INTERVAL.as_secs(),
        "Idle game reaper started"
    );

    let mut interval = tokio::time::interval(REAP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Idle game reaper stopping");
                break;
            }
            _ = interval.tick() => {
                let idle_for = chrono::Duration::minutes(retention_mins);
                let reaped = registry.reap_idle(idle_for, Utc::now());
                if reaped > 0 {
                    tracing::info!(reaped, "Idle game reaper: dropped empty entries");
                } else {
                    tracing::debug!("Idle game reaper: nothing to drop");
                }
            }
        }
    }
}
