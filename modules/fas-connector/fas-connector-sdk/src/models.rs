//! Account models exposed by the FAS connector.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the approved membership list inside a [`UserView`].
pub const APPROVED_MEMBERSHIPS: &str = "approved_memberships";
/// Key of the unapproved membership list inside a [`UserView`].
pub const UNAPPROVED_MEMBERSHIPS: &str = "unapproved_memberships";

/// Flattened account record: the remote `person` object with the
/// account-level `cla`, `admin` and `personal` flags merged in.
///
/// The field set is owned by the remote service, so the view keeps it as
/// a JSON mapping and offers accessors for the fields the connector needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserView(Map<String, Value>);

impl UserView {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.get("username").and_then(Value::as_str)
    }

    /// Approved memberships; empty when the list is absent or malformed.
    #[must_use]
    pub fn approved_memberships(&self) -> &[Value] {
        self.memberships(APPROVED_MEMBERSHIPS)
    }

    /// Unapproved memberships; empty when the list is absent or malformed.
    #[must_use]
    pub fn unapproved_memberships(&self) -> &[Value] {
        self.memberships(UNAPPROVED_MEMBERSHIPS)
    }

    fn memberships(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// A copy of the view with both membership lists removed.
    #[must_use]
    pub fn without_memberships(&self) -> Self {
        let mut fields = self.0.clone();
        fields.remove(APPROVED_MEMBERSHIPS);
        fields.remove(UNAPPROVED_MEMBERSHIPS);
        Self(fields)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for UserView {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One group membership of a user.
///
/// Fields the remote service adds beyond the known schema are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub group_type: Option<String>,
    pub irc_channel: Option<String>,
    pub irc_network: Option<String>,
    pub joinmsg: Option<String>,
    pub mailing_list: Option<String>,
    pub mailing_list_url: Option<String>,
    pub needs_sponsor: Option<bool>,
    pub owner_id: Option<i64>,
    pub prerequisite_id: Option<i64>,
    pub url: Option<String>,
    pub user_can_remove: Option<bool>,
    pub apply_rules: Option<String>,
    pub creation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed parameters of the `usermemberships` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipsQuery {
    pub username: String,
    /// Query the authenticated user instead of `username`.
    pub profile: bool,
    pub show_approved: bool,
    pub show_unapproved: bool,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl MembershipsQuery {
    #[must_use]
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            profile: false,
            show_approved: true,
            show_unapproved: true,
            offset: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

/// A page of memberships with the total count before paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipPage {
    pub count: usize,
    pub items: Vec<MembershipRecord>,
}
