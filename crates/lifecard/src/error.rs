//! Error types for lifecard.
//!
//! This module defines all error types used throughout the lifecard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lifecard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// No current user could be resolved for an operation requiring ownership.
    #[error("not authenticated: sign in before accessing the directory")]
    Unauthenticated,

    /// A required field is missing or malformed. Caught locally, before any
    /// store call is made.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The field that failed validation.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    /// An id/owner pair or public link identifier matched no record.
    #[error("{what} not found")]
    NotFound {
        /// Description of what was looked up.
        what: String,
    },

    /// The photo bucket directory does not exist. Recoverable: callers must
    /// let the record save proceed without a photo.
    #[error("photo storage is not available: bucket directory {bucket} does not exist")]
    StorageUnavailable {
        /// The missing bucket directory.
        bucket: PathBuf,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for lifecard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the given field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a not-found signal.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a local validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is recoverable at the form level.
    ///
    /// A missing photo bucket must not block a record save; the form
    /// downgrades it to a warning and continues.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}
