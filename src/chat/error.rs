// Error types for the chat layer

use thiserror::Error;

use crate::error::RsaError;
use crate::util::file_ops::FileError;

/// Errors raised while managing users and inboxes.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Rsa(#[from] RsaError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error("corrupt user directory: {0}")]
    Json(#[from] serde_json::Error),

    /// No user registered under this id.
    #[error("no registered user has id {0}")]
    UserNotFound(u32),

    /// Supplied key failed the round-trip check.
    #[error("RSA key is not valid")]
    InvalidKey,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("message must have at least one character")]
    EmptyMessage,
}

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
