//! Error types for loader operations.
//!
//! Only configuration, transport, and storage failures terminate a run.
//! Per-record shape and coercion defects are absorbed locally (empty vec /
//! `None` field values) and never surface here.

use thiserror::Error;

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can terminate a loader run.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A required configuration value is missing or empty.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// A configuration value is present but unusable.
    #[error("invalid configuration value for {name}: {value:?}")]
    InvalidConfig {
        /// Name of the offending variable
        name: &'static str,
        /// The rejected value
        value: String,
    },

    /// The provider request failed at the network/HTTP level.
    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The storage request failed at the network level.
    #[error("storage request failed: {0}")]
    StorageTransport(#[source] reqwest::Error),

    /// The storage backend answered with a non-success status.
    #[error("storage backend rejected write to {table}: {status}: {body}")]
    StorageRejected {
        /// Destination table
        table: String,
        /// HTTP status returned by the backend
        status: reqwest::StatusCode,
        /// Response body, for diagnostics
        body: String,
    },

    /// A normalized row could not be serialized for the wire.
    #[error("row serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
