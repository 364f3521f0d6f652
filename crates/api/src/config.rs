use chrono::Duration;
use fieldsync_core::config::{
    ControllerConfig, HandoffTimeoutPolicy, DEFAULT_HANDOFF_WINDOW_SECS,
    DEFAULT_STALE_TIMEOUT_SECS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Lease and handoff timing for the controller registry.
    pub controller: ControllerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `STALE_TIMEOUT_SECS`     | `30`                       |
    /// | `HANDOFF_WINDOW_SECS`    | `5`                        |
    /// | `HANDOFF_TIMEOUT_POLICY` | `auto_accept`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            controller: controller_config_from_env(),
        }
    }
}

/// Load the controller timing knobs from the environment.
fn controller_config_from_env() -> ControllerConfig {
    let stale_secs: i64 = std::env::var("STALE_TIMEOUT_SECS")
        .unwrap_or_else(|_| DEFAULT_STALE_TIMEOUT_SECS.to_string())
        .parse()
        .expect("STALE_TIMEOUT_SECS must be a valid i64");

    let window_secs: i64 = std::env::var("HANDOFF_WINDOW_SECS")
        .unwrap_or_else(|_| DEFAULT_HANDOFF_WINDOW_SECS.to_string())
        .parse()
        .expect("HANDOFF_WINDOW_SECS must be a valid i64");

    let timeout_policy = match std::env::var("HANDOFF_TIMEOUT_POLICY") {
        Ok(name) => HandoffTimeoutPolicy::parse(&name).unwrap_or_else(|| {
            panic!("HANDOFF_TIMEOUT_POLICY must be 'auto_accept' or 'auto_deny', got '{name}'")
        }),
        Err(_) => HandoffTimeoutPolicy::AutoAccept,
    };

    ControllerConfig {
        stale_timeout: Duration::seconds(stale_secs),
        handoff_window: Duration::seconds(window_secs),
        timeout_policy,
    }
}
