//! Request-scoped context handed to connectors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login state established by the authentication layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub session_id: String,
}

/// The authenticated identity and its embedded person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub userid: String,
    #[serde(default)]
    pub person: Option<Value>,
}

/// Everything a connector may read from the current request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestEnv {
    pub login_info: Option<LoginInfo>,
    pub identity: Option<Identity>,
}

impl RequestEnv {
    /// Context of an unauthenticated request.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_login(mut self, session_id: impl Into<String>) -> Self {
        self.login_info = Some(LoginInfo {
            session_id: session_id.into(),
        });
        self
    }

    #[must_use]
    pub fn with_identity(mut self, userid: impl Into<String>, person: Option<Value>) -> Self {
        self.identity = Some(Identity {
            userid: userid.into(),
            person,
        });
        self
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.login_info.as_ref().map(|l| l.session_id.as_str())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.userid.as_str())
    }
}
