use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldsync_api::config::ServerConfig;
use fieldsync_api::router::build_app_router;
use fieldsync_api::state::AppState;
use fieldsync_api::background;
use fieldsync_core::ControllerRegistry;
use fieldsync_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Controller registry ---
    // In-memory only, by design: a restart forces every coach to re-claim,
    // so no stale claim can survive the process.
    let registry = Arc::new(ControllerRegistry::new(config.controller.clone()));
    tracing::info!(
        stale_timeout_secs = config.controller.stale_timeout.num_seconds(),
        handoff_window_secs = config.controller.handoff_window.num_seconds(),
        "Controller registry created"
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn an event logger so role movement is visible in the logs even
    // with no embedding subscriber attached.
    let mut event_rx = event_bus.subscribe();
    let event_log_handle = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            tracing::debug!(?event, "Controller event");
        }
    });

    // --- Background reaper ---
    let reaper_cancel = tokio_util::sync::CancellationToken::new();
    let reaper_handle = tokio::spawn(background::idle_games::run(
        Arc::clone(&registry),
        reaper_cancel.clone(),
    ));

    // --- App state & router ---
    let state = AppState {
        registry,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    tracing::info!("Idle game reaper stopped");

    // Drop the bus sender to close the broadcast channel, which ends the
    // event logger task.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), event_log_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
