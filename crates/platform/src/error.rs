//! Error types for faktory-platform

use thiserror::Error;

/// Errors that can occur in platform operations
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to read file metadata for '{path}': {source}")]
    Metadata {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read lock table: {0}")]
    LockTable(#[source] std::io::Error),

    #[error("Malformed lock table entry: {0}")]
    MalformedEntry(String),
}
