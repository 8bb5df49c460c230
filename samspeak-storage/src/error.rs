//! Error types for samspeak-storage

use samspeak_core::Error as CoreError;
use thiserror::Error;

/// Shared document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network unreachable, connection reset, timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote store answered with a failure status
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] sled::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}
