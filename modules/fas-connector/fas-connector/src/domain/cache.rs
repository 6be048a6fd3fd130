//! TTL cache of user views.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fas_connector_sdk::UserView;
use moka::future::Cache;

/// Key prefix of user view entries.
pub const CACHE_NAMESPACE: &str = "fas_user_info";

/// Cached lookups, absence included, keyed by `"<namespace>_<username>"`.
#[derive(Clone)]
pub struct UserViewCache {
    cache: Cache<String, Option<Arc<UserView>>>,
}

impl UserViewCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    #[must_use]
    pub fn key(username: &str) -> String {
        format!("{CACHE_NAMESPACE}_{username}")
    }

    /// Cached value for `username`, computing it with `init` on a miss.
    ///
    /// Concurrent misses for the same key wait on a single `init`.
    pub async fn get_with<F>(&self, username: &str, init: F) -> Option<Arc<UserView>>
    where
        F: Future<Output = Option<Arc<UserView>>>,
    {
        self.cache.get_with(Self::key(username), init).await
    }

    /// Cached value without computing on a miss.
    pub async fn peek(&self, username: &str) -> Option<Option<Arc<UserView>>> {
        self.cache.get(&Self::key(username)).await
    }

    pub async fn invalidate(&self, username: &str) {
        self.cache.invalidate(&Self::key(username)).await;
    }
}
