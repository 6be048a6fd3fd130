use thiserror::Error;

/// Filter resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A filter declared with `allow_none = false` was absent or `null`.
    #[error("missing required filter '{name}'")]
    MissingRequired { name: String },
}

/// Errors surfaced by [`crate::Query::query`].
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid query filters: {0}")]
    Filter(#[from] FilterError),

    #[error("unknown query path '{0}'")]
    UnknownPath(String),
}

impl ConnectorError {
    /// True when the caller sent an invalid request (as opposed to an unknown path).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Filter(_))
    }
}
