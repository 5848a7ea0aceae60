//! Error types for the keg tracker client.

use thiserror::Error;

/// Result type alias for keg tracker operations.
pub type KegResult<T> = Result<T, KegError>;

/// Errors surfaced by the API client and the client-side guards.
///
/// Every variant displays as a single human-readable message; front ends show
/// it verbatim in an alert, a status line or on stderr.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KegError {
    /// The server answered with a non-success status.
    ///
    /// `message` is the body's `detail` field when present, otherwise the
    /// status line (for example `404 Not Found`).
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message shown to the user.
        message: String,
    },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// A success response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The action was refused before reaching the server.
    #[error("{0}")]
    Refused(String),
}

impl KegError {
    /// Build an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from a non-success server response.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// HTTP status of an API error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for KegError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for KegError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
