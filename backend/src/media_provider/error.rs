//! Error types for media provider operations

use thiserror::Error;

/// Result type for media provider operations
pub type MediaProviderResult<T> = Result<T, MediaProviderError>;

/// Errors that can occur while talking to the media provider
#[derive(Error, Debug)]
pub enum MediaProviderError {
    /// Connection, TLS or timeout failure
    #[error("Media provider request failed: {0}")]
    Transport(String),

    /// Provider rejected the call because of its rate limit (420/429)
    #[error("Media provider rate limit exceeded")]
    RateLimited,

    /// Any other non-success status
    #[error("Media provider returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Body could not be decoded into the expected shape
    #[error("Failed to decode media provider response: {0}")]
    Decode(String),

    /// Client could not be built from the given settings
    #[error("Media provider configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for MediaProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for MediaProviderError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Self::Transport(err.to_string()),
        }
    }
}
