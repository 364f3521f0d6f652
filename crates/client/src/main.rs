//! `fieldsync-client` -- controller state watcher.
//!
//! Polls one game's controller endpoint on behalf of one user and logs
//! every role change and incoming handoff request until Ctrl-C. While the
//! user holds a role, the poll doubles as the lease heartbeat.
//!
//! # Environment variables
//!
//! | Variable        | Required | Default | Description                               |
//! |-----------------|----------|---------|-------------------------------------------|
//! | `FIELDSYNC_URL` | yes      | --      | Server base URL, e.g. `http://host:3000`  |
//! | `GAME_ID`       | yes      | --      | Game to watch                             |
//! | `AUTH_TOKEN`    | yes      | --      | Bearer token for the watching user        |
//! | `USER_ID`       | yes      | --      | User id the token was issued for          |

use std::sync::Arc;

use anyhow::Context;

use fieldsync_client::api::HttpControllerApi;
use fieldsync_client::poller::ControllerPoller;
use fieldsync_client::snapshot::ControllerNotification;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn required_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} environment variable is required"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = required_env("FIELDSYNC_URL")?;
    let game_id = required_env("GAME_ID")?;
    let token = required_env("AUTH_TOKEN")?;
    let user_id = required_env("USER_ID")?;

    tracing::info!(%base_url, %game_id, %user_id, "Starting fieldsync-client");

    let api = Arc::new(HttpControllerApi::new(base_url, token));
    let (poller, mut notifications) = ControllerPoller::new(api, game_id, user_id);
    let handle = poller.spawn();

    loop {
        tokio::select! {
            notification = notifications.recv() => {
                match notification {
                    Some(ControllerNotification::RoleChanged { previous, current }) => {
                        tracing::info!(?previous, ?current, "Role assignment changed");
                    }
                    Some(ControllerNotification::HandoffPending { handoff }) => {
                        tracing::info!(
                            role = %handoff.role,
                            requester = %handoff.requester_name,
                            expires_at = %handoff.expires_at,
                            "Handoff request awaits your response"
                        );
                    }
                    None => break,
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    handle.stop().await;
    tracing::info!("fieldsync-client stopped");
    Ok(())
}
