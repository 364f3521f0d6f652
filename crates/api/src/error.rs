use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fieldsync_core::ControllerError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ControllerError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the controller state machine.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Controller(err) => classify_controller_error(err),

            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, stable error code, and message.
///
/// All controller errors are expected, recoverable conditions -- clients
/// surface them as transient notifications and keep polling.
fn classify_controller_error(err: &ControllerError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        ControllerError::RoleVacant { .. } => (StatusCode::CONFLICT, "ROLE_VACANT"),
        ControllerError::NotHolder { .. } => (StatusCode::FORBIDDEN, "NOT_HOLDER"),
        ControllerError::AlreadyHolder { .. } => (StatusCode::CONFLICT, "ALREADY_HOLDER"),
        ControllerError::HandoffAlreadyPending { .. } => (StatusCode::CONFLICT, "HANDOFF_PENDING"),
        ControllerError::NoPendingHandoff => (StatusCode::NOT_FOUND, "NO_PENDING_HANDOFF"),
    };
    (status, code, err.to_string())
}
