//! CLI error types.

use keg_core::{KegError, KegId};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A server call or client-side guard failed.
    #[error(transparent)]
    Keg(#[from] KegError),
    /// A command failed; the message is what the user sees.
    #[error("{0}")]
    Command(String),
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),
    /// Keg not found.
    #[error("keg not found: {0}")]
    KegNotFound(KegId),
    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
