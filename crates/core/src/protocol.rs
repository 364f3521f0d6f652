//! Request and response payloads for the controller HTTP surface.
//!
//! Lives in `core` so the API handlers and the polling client serialize and
//! deserialize the exact same shapes. All payloads are camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::state::{ControllerState, Role};
use crate::types::Timestamp;

/// Body of `POST .../controller/release`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub role: Role,
}

/// Body of `POST .../controller/handoff-response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffResponseRequest {
    pub accept: bool,
}

/// Result discriminator for a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Claimed,
    HandoffRequested,
}

/// Response of `GET .../controller`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateQueryResponse {
    pub state: ControllerState,
    /// Every role the calling user currently holds (may be both).
    pub my_roles: Vec<Role>,
    /// Whether a pending handoff is waiting on the caller's response.
    pub has_pending_handoff_for_me: bool,
    pub server_time: Timestamp,
}

/// Response of the two claim endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub status: ClaimStatus,
    pub state: ControllerState,
}

/// Response of `POST .../controller/release`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResponse {
    /// Always `"released"`.
    pub status: String,
    pub state: ControllerState,
}

/// Response of `POST .../controller/handoff-response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRespondResponse {
    /// `"accepted"` or `"denied"`.
    pub status: String,
    pub state: ControllerState,
}

/// Response of `POST .../controller/ping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    /// Always `"ok"`; pinging while holding nothing is an idempotent no-op.
    pub status: String,
    /// The roles whose heartbeat this ping refreshed.
    pub pinged: Vec<Role>,
    pub controller_state: ControllerState,
    pub server_time: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_claim_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Claimed).unwrap(),
            r#""claimed""#
        );
        assert_eq!(
            serde_json::to_string(&ClaimStatus::HandoffRequested).unwrap(),
            r#""handoff_requested""#
        );
    }

    #[test]
    fn test_state_query_response_field_names() {
        let response = StateQueryResponse {
            state: ControllerState::default(),
            my_roles: vec![Role::Primary],
            has_pending_handoff_for_me: false,
            server_time: Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["myRoles"], serde_json::json!(["primary"]));
        assert_eq!(json["hasPendingHandoffForMe"], false);
        assert!(json["serverTime"].is_string());
    }

    #[test]
    fn test_ping_response_round_trip() {
        let response = PingResponse {
            status: "ok".into(),
            pinged: vec![Role::Primary, Role::Secondary],
            controller_state: ControllerState::default(),
            server_time: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""controllerState""#));
        let decoded: PingResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, response);
    }
}
