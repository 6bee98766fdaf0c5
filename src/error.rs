//! Custom error types for log-archive
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions, plus the mapping onto process exit codes.

use thiserror::Error;

/// The main error type for log-archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Configuration-related errors (missing or conflicting fields)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Permission denied while creating or writing files
    #[error("Permission error: {0}")]
    Permission(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid glob pattern
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Another run holds the output-directory lock
    #[error("Lock error: {0}")]
    Lock(String),
}

impl ArchiveError {
    /// Map this error onto the process exit code contract:
    /// 2 for configuration errors (bad patterns included), 3 for permission
    /// errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Pattern(_) => 2,
            Self::Permission(_) => 3,
            _ => 1,
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a permission error
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::Permission(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for log-archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
