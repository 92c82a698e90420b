//! Ingestion error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// World view refused the subscription
    #[error("failed to subscribe to world view: {0}")]
    Subscribe(#[source] ContractError),

    /// Feed configuration cannot be run
    #[error("invalid feed {name}: {message}")]
    InvalidFeed {
        name: String,
        message: String,
    },

    /// Recording could not be read
    #[error("failed to read recording {path}: {source}")]
    ReplayIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recording line is not a sensor message
    #[error("{path}:{line}: malformed sensor message: {source}")]
    ReplayParse {
        path: PathBuf,
        /// 1-based line number
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestionError {
    pub fn invalid_feed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFeed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
