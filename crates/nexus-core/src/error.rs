//! Error types for nexus-core

use thiserror::Error;

/// Result type alias using nexus-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nexus-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backup payload rejected before any mutation
    #[error("Invalid import: {0}")]
    InvalidImport(String),

    /// Remote connectivity probe failed while saving settings
    #[error("Remote store check failed: {0}")]
    RemoteProbe(String),
}
