//! Module lifecycle errors

use ingestion::IngestionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    /// `start` called on a running module
    #[error("sensor module is already started")]
    AlreadyStarted,

    /// `start` called after shutdown; the module cannot be restarted
    #[error("sensor module has been shut down")]
    ShutDown,

    /// Listener could not subscribe to the world view
    #[error(transparent)]
    Subscribe(#[from] IngestionError),
}

pub type Result<T> = std::result::Result<T, ModuleError>;
