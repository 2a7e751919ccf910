//! Common error types for Lingua

use thiserror::Error;

/// Common result type for Lingua operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Lingua services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid item batch or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// CEFR list or stored partition missing or corrupt.
    ///
    /// Recovered locally by substituting an empty collection; callers log it
    /// and carry on.
    #[error("Reference data unavailable: {0}")]
    ReferenceDataUnavailable(String),

    /// Persisting a partition failed
    #[error("Failed to write partition {partition}: {source}")]
    PartitionWrite {
        partition: String,
        #[source]
        source: Box<Error>,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a lower-level failure as a write failure for `partition`
    pub fn partition_write(partition: impl Into<String>, source: Error) -> Self {
        Error::PartitionWrite {
            partition: partition.into(),
            source: Box::new(source),
        }
    }
}
