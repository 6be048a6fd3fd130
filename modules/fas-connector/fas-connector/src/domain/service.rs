//! Fetching, caching and reshaping of account data.

use std::sync::Arc;

use fas_connector_sdk::UserView;
use modkit_connector::{RemoteResponse, RequestEnv};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::cache::UserViewCache;
use super::params::{MembershipsParams, UserInfoParams, page_range};
use super::ports::{AccountServicePort, AuthParams};
use crate::config::PageEndMode;

/// Remote resource returning one account record.
pub const USER_VIEW_RESOURCE: &str = "user/view";

/// Account-level flags returned next to the `person` object.
const ACCOUNT_FLAGS: [&str; 3] = ["cla", "admin", "personal"];

/// Account connector service.
pub struct Service {
    remote: Arc<dyn AccountServicePort>,
    cache: UserViewCache,
    page_end: PageEndMode,
}

impl Service {
    #[must_use]
    pub fn new(
        remote: Arc<dyn AccountServicePort>,
        cache: UserViewCache,
        page_end: PageEndMode,
    ) -> Self {
        Self {
            remote,
            cache,
            page_end,
        }
    }

    /// Forward a call, attaching the session of the current login if any.
    #[instrument(skip_all, fields(resource = resource_path))]
    pub async fn call(
        &self,
        env: &RequestEnv,
        resource_path: &str,
        params: &Map<String, Value>,
    ) -> Option<RemoteResponse> {
        let auth = AuthParams {
            session_id: env.session_id().map(str::to_owned),
        };
        debug!(authenticated = auth.is_authenticated(), "forwarding remote call");
        self.remote.send_request(resource_path, &auth, params).await
    }

    /// Fetch `user` and flatten the response into a [`UserView`].
    #[instrument(skip(self, env))]
    pub async fn request_user_view(&self, env: &RequestEnv, user: &str) -> Option<UserView> {
        let mut params = Map::new();
        params.insert("username".to_owned(), Value::String(user.to_owned()));

        let response = self.call(env, USER_VIEW_RESOURCE, &params).await?;
        let view = merge_user_view(response.payload);
        if view.is_none() {
            warn!("user view payload has no person object");
        }
        view
    }

    /// Cache-aside lookup of a user view.
    ///
    /// With `invalidate` set the entry is evicted before the lookup, so the
    /// view is always fetched again.
    pub async fn get_user_view(
        &self,
        env: &RequestEnv,
        user: &str,
        invalidate: bool,
    ) -> Option<Arc<UserView>> {
        if invalidate {
            debug!(user, "invalidating cached user view");
            self.cache.invalidate(user).await;
        }

        self.cache
            .get_with(user, async {
                debug!(user, "user view cache miss");
                self.request_user_view(env, user).await.map(Arc::new)
            })
            .await
    }

    /// Account record for `userinfo`, membership lists stripped.
    #[instrument(skip_all, fields(username = ?params.username))]
    pub async fn query_userinfo(
        &self,
        env: &RequestEnv,
        params: &UserInfoParams,
    ) -> Option<UserView> {
        let Some(user) = params.username.as_deref() else {
            debug!("username is not a string");
            return None;
        };
        let view = self.get_user_view(env, user, false).await?;
        Some(view.without_memberships())
    }

    /// Membership rows for `usermemberships` with the total before paging.
    #[instrument(skip_all, fields(username = ?params.username, profile = params.profile))]
    pub async fn query_usermemberships(
        &self,
        env: &RequestEnv,
        params: &MembershipsParams,
    ) -> (usize, Vec<Value>) {
        let current_user = env.current_user();
        let target = match current_user {
            Some(current) if params.profile => Some(current),
            _ => params.username.as_deref(),
        };

        let embedded = env
            .identity
            .as_ref()
            .filter(|identity| target == Some(identity.userid.as_str()))
            .and_then(|identity| identity.person.as_ref())
            .and_then(Value::as_object);

        let info = match (embedded, target) {
            (Some(person), _) => {
                debug!("reading memberships from the identity");
                Some(Arc::new(UserView::new(person.clone())))
            }
            (None, Some(target)) => self.get_user_view(env, target, false).await,
            (None, None) => None,
        };

        let Some(info) = info else {
            return (0, Vec::new());
        };

        let mut rows = Vec::new();
        if params.show_approved {
            rows.extend_from_slice(info.approved_memberships());
        }
        if params.show_unapproved {
            rows.extend_from_slice(info.unapproved_memberships());
        }

        let count = rows.len();
        let range = page_range(count, params.offset, params.limit, self.page_end);
        debug!(count, start = range.start, end = range.end, "paging memberships");
        (count, rows.drain(range).collect())
    }
}

/// Merge the account flags into the `person` object of a `user/view` payload.
///
/// Returns `None` when the payload carries no `person` object. Missing
/// flags are merged as `null`.
#[must_use]
pub fn merge_user_view(mut payload: Value) -> Option<UserView> {
    let root = payload.as_object_mut()?;
    let Some(Value::Object(mut person)) = root.remove("person") else {
        return None;
    };
    for flag in ACCOUNT_FLAGS {
        let value = root.remove(flag).unwrap_or(Value::Null);
        person.insert(flag.to_owned(), value);
    }
    Some(UserView::new(person))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fas_connector_sdk::{APPROVED_MEMBERSHIPS, UNAPPROVED_MEMBERSHIPS};
    use modkit_connector::ResponseMeta;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Remote double counting calls and recording forwarded sessions.
    #[derive(Default)]
    struct FakeRemote {
        users: Mutex<Map<String, Value>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl FakeRemote {
        fn with_user(self, name: &str, approved: usize, unapproved: usize) -> Self {
            let group = |kind: &str, i: usize| json!({"id": i, "name": format!("{kind}{i}")});
            let payload = json!({
                "cla": "+1",
                "admin": false,
                "personal": true,
                "person": {
                    "username": name,
                    "human_name": "Test User",
                    APPROVED_MEMBERSHIPS: (0..approved).map(|i| group("a", i)).collect::<Vec<_>>(),
                    UNAPPROVED_MEMBERSHIPS: (0..unapproved).map(|i| group("u", i)).collect::<Vec<_>>(),
                }
            });
            self.users.lock().unwrap().insert(name.to_owned(), payload);
            self
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AccountServicePort for FakeRemote {
        async fn send_request(
            &self,
            resource_path: &str,
            auth: &AuthParams,
            req_params: &Map<String, Value>,
        ) -> Option<RemoteResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((resource_path.to_owned(), auth.session_id.clone()));
            let user = req_params.get("username")?.as_str()?;
            let payload = self.users.lock().unwrap().get(user).cloned()?;
            Some(RemoteResponse {
                meta: ResponseMeta {
                    status: 200,
                    session_cookie: None,
                },
                payload,
            })
        }
    }

    fn service(remote: &Arc<FakeRemote>, mode: PageEndMode) -> Service {
        Service::new(
            remote.clone(),
            UserViewCache::new(Duration::from_secs(300), 100),
            mode,
        )
    }

    fn memberships(user: &str) -> MembershipsParams {
        MembershipsParams {
            username: Some(user.to_owned()),
            profile: false,
            show_approved: true,
            show_unapproved: true,
            offset: None,
            limit: None,
        }
    }

    fn names(rows: &[Value]) -> Vec<&str> {
        rows.iter().map(|r| r["name"].as_str().unwrap()).collect()
    }

    #[test]
    fn merge_flattens_account_flags() {
        let view = merge_user_view(json!({
            "cla": "+1",
            "admin": true,
            "person": {"username": "alice"}
        }))
        .unwrap();
        assert_eq!(view.username(), Some("alice"));
        assert_eq!(view.get("cla"), Some(&json!("+1")));
        assert_eq!(view.get("admin"), Some(&json!(true)));
        assert_eq!(view.get("personal"), Some(&Value::Null));
    }

    #[test]
    fn merge_without_person_is_none() {
        assert!(merge_user_view(json!({"cla": "+1"})).is_none());
        assert!(merge_user_view(json!({"person": "alice"})).is_none());
        assert!(merge_user_view(json!([1, 2])).is_none());
    }

    #[tokio::test]
    async fn test_get_user_view_fetches_once_within_ttl() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 1, 0));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        let first = svc.get_user_view(&env, "alice", false).await.unwrap();
        let second = svc.get_user_view(&env, "alice", false).await.unwrap();

        assert_eq!(remote.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_coalesced() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 1, 0));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        let (a, b) = tokio::join!(
            svc.get_user_view(&env, "alice", false),
            svc.get_user_view(&env, "alice", false)
        );

        assert!(a.is_some() && b.is_some());
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_always_refetches() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 1, 0));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        svc.get_user_view(&env, "alice", true).await;
        svc.get_user_view(&env, "alice", true).await;
        svc.get_user_view(&env, "alice", false).await;

        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_is_none_and_cached() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        assert!(svc.get_user_view(&env, "ghost", false).await.is_none());
        assert!(svc.get_user_view(&env, "ghost", false).await.is_none());
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_session_id_is_forwarded() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 0, 0));
        let svc = service(&remote, PageEndMode::Exclusive);

        svc.call(&RequestEnv::anonymous().with_login("s3cr3t"), "group/list", &Map::new())
            .await;
        svc.call(&RequestEnv::anonymous(), "group/list", &Map::new())
            .await;

        let calls = remote.calls.lock().unwrap().clone();
        assert_eq!(calls[0], ("group/list".to_owned(), Some("s3cr3t".to_owned())));
        assert_eq!(calls[1], ("group/list".to_owned(), None));
    }

    #[tokio::test]
    async fn test_userinfo_strips_memberships_without_touching_cache() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        let info = svc
            .query_userinfo(&env, &UserInfoParams {
                username: Some("alice".to_owned()),
            })
            .await
            .unwrap();
        assert!(!info.contains(APPROVED_MEMBERSHIPS));
        assert!(!info.contains(UNAPPROVED_MEMBERSHIPS));
        assert_eq!(info.get("cla"), Some(&json!("+1")));

        // Same cache window: memberships must still be there.
        let (count, _) = svc.query_usermemberships(&env, &memberships("alice")).await;
        assert_eq!(count, 5);
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_userinfo_non_string_username_skips_remote() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(&remote, PageEndMode::Exclusive);

        let info = svc
            .query_userinfo(&RequestEnv::anonymous(), &UserInfoParams { username: None })
            .await;
        assert!(info.is_none());
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_memberships_approved_before_unapproved() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);

        let (count, rows) = svc
            .query_usermemberships(&RequestEnv::anonymous(), &memberships("alice"))
            .await;
        assert_eq!(count, 5);
        assert_eq!(names(&rows), ["a0", "a1", "a2", "u0", "u1"]);
    }

    #[tokio::test]
    async fn test_memberships_show_flags() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        let mut params = memberships("alice");
        params.show_unapproved = false;
        let (count, rows) = svc.query_usermemberships(&env, &params).await;
        assert_eq!(count, 3);
        assert_eq!(names(&rows), ["a0", "a1", "a2"]);

        params.show_approved = false;
        let (count, rows) = svc.query_usermemberships(&env, &params).await;
        assert_eq!(count, 0);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_memberships_paging_modes() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let mut params = memberships("alice");
        params.offset = Some(0);
        params.limit = Some(10);

        let exclusive = service(&remote, PageEndMode::Exclusive);
        let (count, rows) = exclusive
            .query_usermemberships(&RequestEnv::anonymous(), &params)
            .await;
        assert_eq!((count, rows.len()), (5, 5));

        let legacy = service(&remote, PageEndMode::Legacy);
        let (count, rows) = legacy
            .query_usermemberships(&RequestEnv::anonymous(), &params)
            .await;
        assert_eq!(count, 5);
        assert_eq!(names(&rows), ["a0", "a1", "a2", "u0"]);
    }

    #[tokio::test]
    async fn test_memberships_for_current_user_read_identity() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);
        let person = json!({
            "username": "bob",
            APPROVED_MEMBERSHIPS: [{"name": "from-identity"}],
            UNAPPROVED_MEMBERSHIPS: []
        });
        let env = RequestEnv::anonymous().with_identity("bob", Some(person));

        let (count, rows) = svc.query_usermemberships(&env, &memberships("bob")).await;
        assert_eq!(count, 1);
        assert_eq!(names(&rows), ["from-identity"]);
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_current_user_without_person_fetches_remote() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 2, 0));
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous().with_identity("alice", None);

        let (count, rows) = svc.query_usermemberships(&env, &memberships("alice")).await;
        assert_eq!(count, 2);
        assert_eq!(names(&rows), ["a0", "a1"]);
        assert_eq!(remote.calls(), 1);

        let env = RequestEnv::anonymous().with_identity("alice", Some(json!("not an object")));
        let (count, _) = svc.query_usermemberships(&env, &memberships("alice")).await;
        assert_eq!(count, 2);
        assert_eq!(remote.calls(), 1, "second lookup is served from the cache");
    }

    #[tokio::test]
    async fn test_profile_overrides_username() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);
        let person = json!({APPROVED_MEMBERSHIPS: [{"name": "mine"}]});
        let env = RequestEnv::anonymous().with_identity("bob", Some(person));

        let mut params = memberships("alice");
        params.profile = true;
        let (count, rows) = svc.query_usermemberships(&env, &params).await;
        assert_eq!(count, 1);
        assert_eq!(names(&rows), ["mine"]);
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_profile_without_identity_uses_username() {
        let remote = Arc::new(FakeRemote::default().with_user("alice", 3, 2));
        let svc = service(&remote, PageEndMode::Exclusive);

        let mut params = memberships("alice");
        params.profile = true;
        let (count, _) = svc
            .query_usermemberships(&RequestEnv::anonymous(), &params)
            .await;
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_memberships_no_info_is_empty() {
        let remote = Arc::new(FakeRemote::default());
        let svc = service(&remote, PageEndMode::Exclusive);
        let env = RequestEnv::anonymous();

        assert_eq!(
            svc.query_usermemberships(&env, &memberships("ghost")).await,
            (0, Vec::new())
        );

        let mut params = memberships("x");
        params.username = None;
        assert_eq!(svc.query_usermemberships(&env, &params).await, (0, Vec::new()));
        assert_eq!(remote.calls(), 1);
    }
}
