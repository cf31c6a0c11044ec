//! Domain errors for the ratestash core.

use thiserror::Error;

/// Domain-level errors that can occur in the rates core.
///
/// Lower layers never swallow these: the cache propagates to the
/// repository, the repository propagates to the calling action, and only
/// the action layer turns them into user-facing messages.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid rate value for {currency}: {value}")]
    InvalidRate { currency: String, value: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::CacheIo(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::RemoteFetch(err.to_string())
    }
}
