//! Capabilities a connector offers to the host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::env::RequestEnv;
use crate::error::ConnectorError;
use crate::registry::PathRegistry;
use crate::request::{QueryRequest, QueryResult};

/// Transport-level details of a successful remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
    /// Session cookie returned by the remote service, if any.
    pub session_cookie: Option<String>,
}

/// The two-part answer of a remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub meta: ResponseMeta,
    pub payload: Value,
}

/// Declares the query paths a connector serves.
pub trait Connector: Send + Sync {
    /// Short name of the connector, used in logs and by hosts.
    fn name(&self) -> &'static str;

    fn register(&self, registry: &mut PathRegistry);
}

/// Raw pass-through to the remote source.
#[async_trait]
pub trait Call: Send + Sync {
    /// Forward `params` to `resource_path`.
    ///
    /// Any failure is reported as `None`; callers cannot distinguish an
    /// outage from an empty answer.
    async fn call(
        &self,
        env: &RequestEnv,
        resource_path: &str,
        params: &Map<String, Value>,
    ) -> Option<RemoteResponse>;
}

/// Answers queries against registered paths.
#[async_trait]
pub trait Query: Send + Sync {
    /// Run `request` against the path called `path`.
    ///
    /// `Ok(None)` means "no result", which is distinct from an empty result set.
    ///
    /// # Errors
    /// [`ConnectorError::Filter`] when the request filters fail validation,
    /// [`ConnectorError::UnknownPath`] when `path` is not served by this connector.
    async fn query(
        &self,
        env: &RequestEnv,
        path: &str,
        request: &QueryRequest,
    ) -> Result<Option<QueryResult>, ConnectorError>;
}
