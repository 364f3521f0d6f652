//! Shared response envelope types for API handlers.
//!
//! Admin responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })` to get
//! compile-time type safety and consistent serialization. Controller
//! endpoints return the protocol payloads from `fieldsync_core::protocol`
//! directly, since the polling client deserializes those shapes.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
