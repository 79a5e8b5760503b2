//! Error types for content store operations

use thiserror::Error;

/// Result type for content store operations
pub type ContentStoreResult<T> = Result<T, ContentStoreError>;

/// Errors that can occur while reading or writing posts and projects
#[derive(Error, Debug)]
pub enum ContentStoreError {
    /// Requested post or project does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database query failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
