//! Error taxonomy for the remote API boundary.

use thiserror::Error;

/// Errors surfaced by API adapters.
///
/// Callers distinguish three recoveries: `Unauthorized` drops the session
/// and sends the user to the connect screen, `Malformed` is a contract
/// violation worth reporting, everything else is retried manually.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not authorized; check the configured token")]
    Unauthorized,

    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid API base url: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// True when a retry of the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status(status) => status.is_server_error(),
            ApiError::Unauthorized | ApiError::Malformed(_) | ApiError::InvalidBaseUrl(_) => false,
        }
    }
}
