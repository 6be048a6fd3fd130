use async_trait::async_trait;
use modkit_connector::RemoteResponse;
use serde_json::{Map, Value};

/// Credentials forwarded with a remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthParams {
    pub session_id: Option<String>,
}

impl AuthParams {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some()
    }
}

/// Outbound port to the account service.
#[async_trait]
pub trait AccountServicePort: Send + Sync {
    /// Send `req_params` to `resource_path`; `None` on any failure.
    async fn send_request(
        &self,
        resource_path: &str,
        auth: &AuthParams,
        req_params: &Map<String, Value>,
    ) -> Option<RemoteResponse>;
}
