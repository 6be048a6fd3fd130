//! FAS connector: registration and query dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use fas_connector_sdk::AccountInfoClient;
use modkit_connector::{
    Call, Connector, ConnectorError, ParamFilter, PathRegistry, Query, QueryRequest, QueryResult,
    RemoteResponse, RequestEnv, SortOrder,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::config::FasConnectorConfig;
use crate::domain::params::{MembershipsParams, UserInfoParams};
use crate::domain::{AccountInfoLocalClient, AccountServicePort, Service, UserViewCache};
use crate::infra::FasClient;

/// Paginated membership listing.
pub const USERMEMBERSHIPS_PATH: &str = "usermemberships";
/// Single account record.
pub const USERINFO_PATH: &str = "userinfo";

/// Columns of `usermemberships` with their default visibility.
/// None of them can be sorted or wildcard-filtered.
const MEMBERSHIP_COLUMNS: [(&str, bool); 16] = [
    ("id", false),
    ("name", true),
    ("display_name", true),
    ("group_type", true),
    ("irc_channel", true),
    ("irc_network", true),
    ("joinmsg", true),
    ("mailing_list", true),
    ("mailing_list_url", true),
    ("needs_sponsor", true),
    ("owner_id", true),
    ("prerequisite_id", true),
    ("url", true),
    ("user_can_remove", true),
    ("apply_rules", true),
    ("creation", true),
];

const USERNAME_ALIASES: [&str; 3] = ["u", "user", "name"];

fn usermemberships_filter() -> ParamFilter {
    ParamFilter::new()
        .add_filter("username", &USERNAME_ALIASES, false)
        .add_filter("profile", &[], true)
        .add_filter("show_approved", &["approved", "a"], true)
        .add_filter("show_unapproved", &["unapproved", "un"], true)
}

fn userinfo_filter() -> ParamFilter {
    ParamFilter::new().add_filter("username", &USERNAME_ALIASES, false)
}

/// Connector exposing FAS accounts as the `usermemberships` and `userinfo` paths.
pub struct FasConnector {
    service: Arc<Service>,
    usermemberships_filter: ParamFilter,
    userinfo_filter: ParamFilter,
}

impl FasConnector {
    /// Build the connector against the remote service named in `cfg`.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(cfg: &FasConnectorConfig) -> anyhow::Result<Self> {
        info!(
            base_url = %cfg.base_url,
            insecure = cfg.insecure,
            cache_ttl_secs = cfg.cache_ttl.as_secs(),
            page_end = ?cfg.page_end,
            "initializing FAS connector"
        );
        let remote = Arc::new(FasClient::new(cfg)?);
        Ok(Self::with_remote(remote, cfg))
    }

    /// Build the connector on top of an arbitrary remote port.
    #[must_use]
    pub fn with_remote(remote: Arc<dyn AccountServicePort>, cfg: &FasConnectorConfig) -> Self {
        let cache = UserViewCache::new(cfg.cache_ttl, cfg.cache_max_entries);
        Self {
            service: Arc::new(Service::new(remote, cache, cfg.page_end)),
            usermemberships_filter: usermemberships_filter(),
            userinfo_filter: userinfo_filter(),
        }
    }

    /// Typed client sharing this connector's cache.
    #[must_use]
    pub fn client(&self) -> Arc<dyn AccountInfoClient> {
        Arc::new(AccountInfoLocalClient::new(self.service.clone()))
    }

    #[instrument(skip_all, fields(path = USERINFO_PATH))]
    async fn query_userinfo(
        &self,
        env: &RequestEnv,
        request: &QueryRequest,
    ) -> Result<Option<QueryResult>, ConnectorError> {
        let filters = self.userinfo_filter.filter(&request.filters)?;
        let params = UserInfoParams::from(&filters);

        // there is only ever one row
        Ok(self
            .service
            .query_userinfo(env, &params)
            .await
            .map(|view| QueryResult::new(1, vec![view.into_value()])))
    }

    #[instrument(skip_all, fields(path = USERMEMBERSHIPS_PATH))]
    async fn query_usermemberships(
        &self,
        env: &RequestEnv,
        request: &QueryRequest,
    ) -> Result<Option<QueryResult>, ConnectorError> {
        let filters = self.usermemberships_filter.filter(&request.filters)?;
        let params = MembershipsParams::from_filters(&filters, request);

        let (count, rows) = self.service.query_usermemberships(env, &params).await;
        Ok(Some(QueryResult::new(count, rows)))
    }
}

impl Connector for FasConnector {
    fn name(&self) -> &'static str {
        "fas"
    }

    fn register(&self, registry: &mut PathRegistry) {
        let path = registry
            .register_path(USERMEMBERSHIPS_PATH, true)
            .primary_key_col("id")
            .default_sort_col("name")
            .default_sort_order(SortOrder::Descending);
        for (name, visible) in MEMBERSHIP_COLUMNS {
            path.register_column(name, visible, false, false);
        }

        registry.register_path(USERINFO_PATH, false);

        info!(paths = registry.len(), "registered FAS query paths");
    }
}

#[async_trait]
impl Call for FasConnector {
    async fn call(
        &self,
        env: &RequestEnv,
        resource_path: &str,
        params: &Map<String, Value>,
    ) -> Option<RemoteResponse> {
        self.service.call(env, resource_path, params).await
    }
}

#[async_trait]
impl Query for FasConnector {
    async fn query(
        &self,
        env: &RequestEnv,
        path: &str,
        request: &QueryRequest,
    ) -> Result<Option<QueryResult>, ConnectorError> {
        match path {
            USERMEMBERSHIPS_PATH => self.query_usermemberships(env, request).await,
            USERINFO_PATH => self.query_userinfo(env, request).await,
            other => Err(ConnectorError::UnknownPath(other.to_owned())),
        }
    }
}
