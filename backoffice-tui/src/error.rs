//! Error types for the console.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::persistence::PersistenceError;
use backoffice_client::SetupError;
use backoffice_core::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
