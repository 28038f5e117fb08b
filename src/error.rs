//! Error types for the Falcata library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`FalcataError`] enum. Field-level problems (a value that cannot be
//! rendered or encoded) are reported as [`FalcataError::ValueType`];
//! index-level problems have their own variants so callers can match on
//! them without parsing messages.
//!
//! # Examples
//!
//! ```
//! use falcata::error::{FalcataError, Result};
//!
//! fn lookup(found: bool) -> Result<u32> {
//!     if found {
//!         Ok(1)
//!     } else {
//!         Err(FalcataError::not_found("document 42"))
//!     }
//! }
//!
//! assert!(matches!(lookup(false), Err(FalcataError::NotFound(_))));
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Falcata operations.
#[derive(Error, Debug)]
pub enum FalcataError {
    /// I/O errors (resource files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value has no usable string or byte representation.
    #[error("Value type error: {0}")]
    ValueType(String),

    /// An operation needs a bound index (for policy or resources) but none is set.
    #[error("Resource not configured: {0}")]
    ResourceNotConfigured(String),

    /// A second transaction was attempted while one is active.
    #[error("Concurrent mutation: {0}")]
    ConcurrentMutation(String),

    /// Lookup by identifier found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Analysis-related errors (tokenization, stemming, stopwords)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Field-related errors
    #[error("Field error: {0}")]
    Field(String),

    /// Index engine errors
    #[error("Index error: {0}")]
    Index(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with FalcataError.
pub type Result<T> = std::result::Result<T, FalcataError>;

impl FalcataError {
    /// Create a new value type error.
    pub fn value_type<S: Into<String>>(msg: S) -> Self {
        FalcataError::ValueType(msg.into())
    }

    /// Create a new resource-not-configured error.
    pub fn resource_not_configured<S: Into<String>>(msg: S) -> Self {
        FalcataError::ResourceNotConfigured(msg.into())
    }

    /// Create a new concurrent mutation error.
    pub fn concurrent_mutation<S: Into<String>>(msg: S) -> Self {
        FalcataError::ConcurrentMutation(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        FalcataError::NotFound(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        FalcataError::Analysis(msg.into())
    }

    /// Create a new field error.
    pub fn field<S: Into<String>>(msg: S) -> Self {
        FalcataError::Field(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        FalcataError::Index(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FalcataError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FalcataError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
