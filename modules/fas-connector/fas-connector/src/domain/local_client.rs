//! Local (in-process) client for the FAS connector.

use std::sync::Arc;

use async_trait::async_trait;
use fas_connector_sdk::{
    AccountInfoClient, AccountInfoError, MembershipPage, MembershipRecord, MembershipsQuery,
    UserView,
};
use modkit_connector::RequestEnv;

use super::Service;
use super::params::{MembershipsParams, UserInfoParams};

/// Typed client wrapping the connector service.
pub struct AccountInfoLocalClient {
    svc: Arc<Service>,
}

impl AccountInfoLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

#[async_trait]
impl AccountInfoClient for AccountInfoLocalClient {
    async fn get_user_view(
        &self,
        env: &RequestEnv,
        username: &str,
        invalidate: bool,
    ) -> Result<Option<Arc<UserView>>, AccountInfoError> {
        Ok(self.svc.get_user_view(env, username, invalidate).await)
    }

    async fn user_info(
        &self,
        env: &RequestEnv,
        username: &str,
    ) -> Result<Option<UserView>, AccountInfoError> {
        let params = UserInfoParams {
            username: Some(username.to_owned()),
        };
        Ok(self.svc.query_userinfo(env, &params).await)
    }

    async fn user_memberships(
        &self,
        env: &RequestEnv,
        query: &MembershipsQuery,
    ) -> Result<MembershipPage, AccountInfoError> {
        let (count, rows) = self
            .svc
            .query_usermemberships(env, &MembershipsParams::from(query))
            .await;

        let items = rows
            .into_iter()
            .map(serde_json::from_value::<MembershipRecord>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::error!(error = %e, "membership row does not match the record schema");
                AccountInfoError::from(e)
            })?;

        Ok(MembershipPage { count, items })
    }
}
