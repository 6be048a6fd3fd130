//! Typed API for in-process consumers of the FAS connector.

use std::sync::Arc;

use async_trait::async_trait;
use modkit_connector::RequestEnv;

use crate::error::AccountInfoError;
use crate::models::{MembershipPage, MembershipsQuery, UserView};

/// Typed facade over the connector's query paths.
///
/// Not-found is reported as `Ok(None)`; a remote outage looks the same.
#[async_trait]
pub trait AccountInfoClient: Send + Sync {
    /// Cached account record, membership lists included.
    ///
    /// With `invalidate` set the cache entry is dropped and refetched.
    /// The session in `env` is only used when the entry has to be fetched.
    async fn get_user_view(
        &self,
        env: &RequestEnv,
        username: &str,
        invalidate: bool,
    ) -> Result<Option<Arc<UserView>>, AccountInfoError>;

    /// Account record without membership lists.
    async fn user_info(
        &self,
        env: &RequestEnv,
        username: &str,
    ) -> Result<Option<UserView>, AccountInfoError>;

    /// One page of memberships, approved before unapproved.
    async fn user_memberships(
        &self,
        env: &RequestEnv,
        query: &MembershipsQuery,
    ) -> Result<MembershipPage, AccountInfoError>;
}
