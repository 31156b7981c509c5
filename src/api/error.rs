//! API Client Error Types
//!
//! Request failures never surface as Rust errors: they are folded into the
//! response envelope. The only fallible step is building the client.

use thiserror::Error;

/// Errors raised while constructing an [`ApiClient`](super::ApiClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// The base URL is empty or not an absolute http(s) URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be created
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Result type for client construction
pub type ClientResult<T> = Result<T, ClientError>;
