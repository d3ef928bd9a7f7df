//! Load Error Types
//!
//! Failures of a single chart or insights load. They are caught at the
//! smallest enclosing scope and turned into an inline error panel; none of
//! them reach the global error banner.

use thiserror::Error;

use crate::charts::RenderError;

/// Errors from fetching, decoding or rendering one dashboard panel
#[derive(Error, Debug)]
pub enum LoadError {
    /// Backend answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Backend answered with an `error` field in the payload
    #[error("{0}")]
    Api(String),

    /// Charting engine rejected the figure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Request timeout")]
    Timeout,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Response body was not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LoadError::Timeout
        } else if e.is_connect() {
            LoadError::Unavailable(e.to_string())
        } else if e.is_decode() {
            LoadError::Decode(e.to_string())
        } else {
            LoadError::Request(e)
        }
    }
}

/// Result type for panel loads
pub type LoadResult<T> = Result<T, LoadError>;
