//! Error types for nexus-api

use thiserror::Error;

/// Result type alias using nexus-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status with a body we could not parse
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local I/O failed (reading attachments)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the backend rejected our credentials
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status == 401 || *status == 403,
            Error::Http(e) => e
                .status()
                .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_statuses() {
        assert!(Error::api(401, "missing token").is_unauthorized());
        assert!(Error::api(403, "forbidden").is_unauthorized());
    }

    #[test]
    fn test_not_unauthorized() {
        assert!(!Error::api(500, "boom").is_unauthorized());
        assert!(!Error::Sse("reset".into()).is_unauthorized());
        assert!(!Error::InvalidConfig("no url".into()).is_unauthorized());
    }

    #[test]
    fn test_api_error_display() {
        let e = Error::api(500, "database unavailable");
        assert_eq!(
            e.to_string(),
            "API error: database unavailable (status: 500)"
        );
    }
}
