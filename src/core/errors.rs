//! Error types for the assistant subsystem.

use thiserror::Error;

/// Assistant subsystem error type.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Transient network failure; the calling stage may retry.
    #[error("transient network error: {0}")]
    TransientNetwork(String),
    /// Fatal model-side failure for this call; retrying will not help.
    #[error("model error: {0}")]
    Model(String),
    /// The completion stream dropped mid-response.
    #[error("completion stream interrupted: {reason}")]
    StreamInterrupted {
        /// Cause of the interruption.
        reason: String,
        /// Text produced before the interruption, possibly empty.
        partial: String,
    },
    /// Best-effort persistence failure; logged, never surfaced to the user.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// A second send was attempted while an exchange was in flight.
    #[error("an exchange is already in flight for this session")]
    ConcurrencyViolation,
    /// Embedding error from the Rig provider.
    #[error("embedding error: {0}")]
    Embedding(#[from] rig::embeddings::EmbeddingError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        let retryable = err.is_timeout()
            || err.is_connect()
            || err.status().is_some_and(|status| status.is_server_error());
        if retryable {
            Self::TransientNetwork(err.to_string())
        } else {
            Self::Model(err.to_string())
        }
    }
}

/// Convenience result alias for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;
