//! Error types for the wikifolio client.

use thiserror::Error;

/// Every failure surfaced by a wikifolio client.
///
/// Upstream failures keep the HTTP status and the response body exactly as
/// received so callers can decide whether to retry, abort or alert.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WikifolioError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl WikifolioError {
    /// Whether repeating the same call could plausibly succeed.
    ///
    /// The client never acts on this itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            WikifolioError::Network(_) => true,
            WikifolioError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of the upstream response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            WikifolioError::Authentication { status, .. }
            | WikifolioError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for wikifolio operations.
pub type WikifolioResult<T> = Result<T, WikifolioError>;
