//! Error types for the boardmap server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Startup errors
#[derive(Debug)]
pub enum ServerError {
    Storage(local_state::StorageError),
    Resolver(maplink_resolver::ResolveError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Storage(err) => write!(f, "Local storage error: {}", err),
            ServerError::Resolver(err) => write!(f, "Resolver setup error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Storage(err) => Some(err),
            ServerError::Resolver(err) => Some(err),
            ServerError::Io(err) => Some(err.as_ref()),
            ServerError::Config(_) => None,
        }
    }
}

impl From<local_state::StorageError> for ServerError {
    fn from(err: local_state::StorageError) -> Self {
        ServerError::Storage(err)
    }
}

impl From<maplink_resolver::ResolveError> for ServerError {
    fn from(err: maplink_resolver::ResolveError) -> Self {
        ServerError::Resolver(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Handler error that converts to an HTTP response
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    TooManyRequests(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Marker store request failed");
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<local_state::StorageError> for AppError {
    fn from(err: local_state::StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}
