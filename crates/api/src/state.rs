use std::sync::Arc;

use fieldsync_core::ControllerRegistry;
use fieldsync_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The authoritative in-memory controller registry.
    pub registry: Arc<ControllerRegistry>,
    /// Server configuration (JWT secret, controller timers).
    pub config: Arc<ServerConfig>,
    /// In-process bus of controller events for the embedding application.
    pub event_bus: Arc<EventBus>,
}
