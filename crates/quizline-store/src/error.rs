//! Store error types.

use thiserror::Error;

/// Errors that can occur when reading content or writing results.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested test does not exist in the store.
    #[error("test not found: {0}")]
    NotFound(String),

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote store returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Stored content could not be decoded.
    #[error("invalid content: {0}")]
    InvalidContent(String),
}
