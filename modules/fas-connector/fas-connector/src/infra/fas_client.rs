use anyhow::Context;
use async_trait::async_trait;
use modkit_connector::{RemoteResponse, ResponseMeta};
use reqwest::header::{ACCEPT, SET_COOKIE};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::FasConnectorConfig;
use crate::domain::ports::{AccountServicePort, AuthParams};

/// Why a remote call produced no data. Only ever logged.
#[derive(Debug, Error)]
enum FetchError {
    #[error("invalid resource URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote application error: {0}")]
    Remote(String),
}

/// HTTP client of the FAS account service.
///
/// Requests are form-encoded POSTs to `<base_url>/<resource_path>` asking
/// for a JSON answer.
pub struct FasClient {
    client: reqwest::Client,
    base_url: Url,
    session_cookie: String,
}

impl FasClient {
    /// Build the client from connector settings.
    ///
    /// # Errors
    /// Returns an error when the base URL is invalid or the TLS backend fails to initialise.
    pub fn new(cfg: &FasConnectorConfig) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid FAS base URL '{}'", cfg.base_url))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        if cfg.insecure {
            warn!(base_url = %base_url, "TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.as_str())
            .danger_accept_invalid_certs(cfg.insecure)
            .build()
            .context("failed to build FAS HTTP client")?;

        Ok(Self {
            client,
            base_url,
            session_cookie: cfg.session_cookie.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resource_url(&self, resource_path: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(resource_path.trim_start_matches('/'))?;
        url.query_pairs_mut().append_pair("tg_format", "json");
        Ok(url)
    }

    async fn fetch(
        &self,
        resource_path: &str,
        auth: &AuthParams,
        req_params: &Map<String, Value>,
    ) -> Result<RemoteResponse, FetchError> {
        let url = self.resource_url(resource_path)?;

        let mut form = form_fields(req_params);
        if let Some(session_id) = &auth.session_id {
            form.push(("session_id".to_owned(), session_id.clone()));
        }

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let session_cookie = find_cookie(response.headers(), &self.session_cookie);
        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;

        if let Some(exc) = payload.get("exc") {
            let message = payload
                .get("tg_flash")
                .and_then(Value::as_str)
                .map_or_else(|| exc.to_string(), str::to_owned);
            return Err(FetchError::Remote(message));
        }

        Ok(RemoteResponse {
            meta: ResponseMeta {
                status: status.as_u16(),
                session_cookie,
            },
            payload,
        })
    }
}

#[async_trait]
impl AccountServicePort for FasClient {
    #[instrument(skip_all, fields(base_url = %self.base_url, resource = resource_path))]
    async fn send_request(
        &self,
        resource_path: &str,
        auth: &AuthParams,
        req_params: &Map<String, Value>,
    ) -> Option<RemoteResponse> {
        match self.fetch(resource_path, auth, req_params).await {
            Ok(response) => {
                debug!(status = response.meta.status, "remote call succeeded");
                Some(response)
            }
            Err(e) => {
                warn!(error = %e, "remote call failed");
                None
            }
        }
    }
}

/// Flatten JSON params into form fields. Strings are sent verbatim, `null`
/// is skipped and everything else is sent as its JSON text.
fn form_fields(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}

fn find_cookie(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_owned())
}
