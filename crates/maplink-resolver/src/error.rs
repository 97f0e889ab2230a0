use std::fmt;

/// Errors from resolving a map link
#[derive(Debug)]
pub enum ResolveError {
    MissingUrl,
    InvalidUrl(String),
    Http(reqwest::Error),
    TimedOut,
    Cancelled,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "Missing url in request body"),
            Self::InvalidUrl(msg) => write!(f, "Invalid url: {msg}"),
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::TimedOut => write!(f, "Timed out while following map link"),
            Self::Cancelled => write!(f, "Map link resolution was cancelled"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else {
            Self::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
