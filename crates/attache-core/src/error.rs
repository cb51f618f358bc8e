//! Error types module
//!
//! This module provides the unified error type used throughout Attache. Component
//! crates keep their own error enums (`ValidationError`, `StorageError`) and lift
//! them into `AppError` at the service boundary, where `ErrorMetadata` decides what
//! an untrusted caller is allowed to see.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected or suspicious input
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP-like status code placed in the response envelope
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the whole call may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must be withheld from untrusted callers
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Content mismatch: {0}")]
    ContentMismatch(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Path traversal: {0}")]
    PathTraversal(String),

    #[error("Name generation exhausted: {0}")]
    NameGenerationExhausted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{primary}; cleanup also failed: {cleanup}")]
    CleanupFailed {
        #[source]
        primary: Box<AppError>,
        cleanup: String,
    },

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidArgument(_) => (400, "INVALID_ARGUMENT", false, false, LogLevel::Debug),
        AppError::InvalidFilename(_) => (400, "INVALID_FILENAME", false, false, LogLevel::Debug),
        AppError::UnsupportedExtension(_) => {
            (415, "UNSUPPORTED_EXTENSION", false, false, LogLevel::Debug)
        }
        AppError::ContentMismatch(_) => (400, "CONTENT_MISMATCH", false, false, LogLevel::Warn),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::PathTraversal(_) => (400, "PATH_TRAVERSAL", false, false, LogLevel::Warn),
        AppError::NameGenerationExhausted(_) => {
            (503, "NAME_GENERATION_EXHAUSTED", true, true, LogLevel::Warn)
        }
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::CleanupFailed { .. } => (500, "CLEANUP_FAILED", false, true, LogLevel::Error),
        AppError::Database(_) => (500, "DATABASE_ERROR", false, true, LogLevel::Error),
        AppError::Io(_) => (500, "IO_ERROR", false, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Attach a failed rollback to the failure that triggered it.
    pub fn with_cleanup_failure(self, cleanup: impl Into<String>) -> Self {
        AppError::CleanupFailed {
            primary: Box::new(self),
            cleanup: cleanup.into(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(ref msg) => msg.clone(),
            AppError::InvalidFilename(_) => "Invalid filename".to_string(),
            AppError::UnsupportedExtension(ref ext) => {
                format!("File type not allowed: {}", ext)
            }
            AppError::ContentMismatch(_) => {
                "File content does not match its extension".to_string()
            }
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::PathTraversal(_) => "Invalid file path".to_string(),
            AppError::NameGenerationExhausted(_) => {
                "Could not allocate a storage name, please retry".to_string()
            }
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Database(_) => "Database Error".to_string(),
            AppError::CleanupFailed { .. } | AppError::Io(_) | AppError::Internal(_) => {
                "Server Error".to_string()
            }
        }
    }
}
