//! HTTP transport for the controller endpoints.
//!
//! [`ControllerApi`] is the seam between the polling loop and the network,
//! so poller tests can substitute a scripted fake. [`HttpControllerApi`] is
//! the real implementation over [`reqwest`] with a bearer token.

use async_trait::async_trait;
use serde::Deserialize;

use fieldsync_core::protocol::{
    ClaimResponse, HandoffRespondResponse, HandoffResponseRequest, PingResponse, ReleaseRequest,
    ReleaseResponse, StateQueryResponse,
};
use fieldsync_core::Role;

/// Errors from the controller API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a non-2xx status with a structured error body.
    #[error("API error ({status}) {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Stable error code, e.g. `NOT_HOLDER`.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl ClientError {
    /// Whether this error is worth retrying on the next poll cycle.
    ///
    /// Transport failures and server-side 5xx responses are transient;
    /// structured 4xx responses are answers, not outages.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
        }
    }
}

/// Structured error body produced by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// The controller operations a client can perform against one server.
///
/// All methods take the game id so a single transport can serve several
/// pollers.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// `GET .../controller` -- read the swept state.
    async fn fetch_state(&self, game_id: &str) -> Result<StateQueryResponse, ClientError>;

    /// `POST .../controller/claim-{role}` -- claim or open a handoff.
    async fn claim(&self, game_id: &str, role: Role) -> Result<ClaimResponse, ClientError>;

    /// `POST .../controller/release` -- give up a held role.
    async fn release(&self, game_id: &str, role: Role) -> Result<ReleaseResponse, ClientError>;

    /// `POST .../controller/handoff-response` -- answer the pending handoff.
    async fn respond(
        &self,
        game_id: &str,
        accept: bool,
    ) -> Result<HandoffRespondResponse, ClientError>;

    /// `POST .../controller/ping` -- heartbeat held roles and read state.
    async fn ping(&self, game_id: &str) -> Result<PingResponse, ClientError>;
}

/// [`ControllerApi`] over HTTP with bearer-token auth.
pub struct HttpControllerApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpControllerApi {
    /// Create a transport for one server.
    ///
    /// * `base_url` - e.g. `http://localhost:3000` (no trailing slash).
    /// * `token` - JWT sent as `Authorization: Bearer <token>`.
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Create a transport reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    fn controller_url(&self, game_id: &str, suffix: &str) -> String {
        format!(
            "{}/api/v1/games/{}/controller{}",
            self.base_url, game_id, suffix
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let mut request = self.client.post(url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Decode a success body, or lift the server's `{ error, code }` body
    /// into [`ClientError::Api`].
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.code, body.error),
                Err(_) => ("UNKNOWN".to_string(), text),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ControllerApi for HttpControllerApi {
    async fn fetch_state(&self, game_id: &str) -> Result<StateQueryResponse, ClientError> {
        self.get_json(self.controller_url(game_id, "")).await
    }

    async fn claim(&self, game_id: &str, role: Role) -> Result<ClaimResponse, ClientError> {
        let suffix = match role {
            Role::Primary => "/claim-primary",
            Role::Secondary => "/claim-secondary",
        };
        self.post_json(self.controller_url(game_id, suffix), None)
            .await
    }

    async fn release(&self, game_id: &str, role: Role) -> Result<ReleaseResponse, ClientError> {
        let body = serde_json::to_value(ReleaseRequest { role })
            .expect("ReleaseRequest is always serialisable");
        self.post_json(self.controller_url(game_id, "/release"), Some(body))
            .await
    }

    async fn respond(
        &self,
        game_id: &str,
        accept: bool,
    ) -> Result<HandoffRespondResponse, ClientError> {
        let body = serde_json::to_value(HandoffResponseRequest { accept })
            .expect("HandoffResponseRequest is always serialisable");
        self.post_json(self.controller_url(game_id, "/handoff-response"), Some(body))
            .await
    }

    async fn ping(&self, game_id: &str) -> Result<PingResponse, ClientError> {
        self.post_json(self.controller_url(game_id, "/ping"), None)
            .await
    }
}
