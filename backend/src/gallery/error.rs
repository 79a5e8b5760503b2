//! Error types for gallery operations

use thiserror::Error;

use crate::media_provider::MediaProviderError;

/// Result type for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors surfaced by the gallery to the endpoint layer
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Missing or malformed request parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Media provider failed and the failure could not be recovered
    #[error("Upstream error: {0}")]
    UpstreamError(#[from] MediaProviderError),
}
