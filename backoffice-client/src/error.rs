//! Client construction errors.

use thiserror::Error;

/// Failures while building a transport; request failures are
/// [`backoffice_core::ClientError`]s.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),

    #[error("Invalid credential header: {0}")]
    Header(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
