//! Error types for the FAS connector.

use modkit_connector::ConnectorError;
use thiserror::Error;

/// Errors returned by [`crate::AccountInfoClient`].
#[derive(Debug, Error)]
pub enum AccountInfoError {
    /// The request filters failed validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A membership row could not be decoded into a typed record.
    #[error("invalid membership record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConnectorError> for AccountInfoError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Filter(e) => Self::Validation(e.to_string()),
            e @ ConnectorError::UnknownPath(_) => Self::Internal(e.to_string()),
        }
    }
}
