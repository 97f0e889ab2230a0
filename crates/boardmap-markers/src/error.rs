//! Error types for the marker store client

use std::fmt;

/// Errors that can occur when talking to the marker store
#[derive(Debug)]
pub enum MarkerStoreError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse JSON response
    Json(serde_json::Error),
    /// The store answered with a non-success status
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl fmt::Display for MarkerStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Marker store HTTP error: {}", e),
            Self::Json(e) => write!(f, "Marker store JSON parse error: {}", e),
            Self::Status { status, body } if body.is_empty() => {
                write!(f, "Fetch failed: {}", status)
            }
            Self::Status { status, body } => write!(f, "Fetch failed: {} {}", status, body),
        }
    }
}

impl std::error::Error for MarkerStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for MarkerStoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for MarkerStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for marker store operations
pub type Result<T> = std::result::Result<T, MarkerStoreError>;
