//! Error types for pagelift.

use thiserror::Error;

/// Result type alias using pagelift's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pagelift operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Landing page not found
    #[error("Landing page not found: {0}")]
    PageNotFound(uuid::Uuid),

    /// Lead not found
    #[error("Lead not found: {0}")]
    LeadNotFound(uuid::Uuid),

    /// A unique constraint was violated (e.g. duplicate slug)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Outbound HTTP request failed (Google, LinkedIn, WordPress)
    #[error("Request error: {0}")]
    Request(String),

    /// A third-party integration is not configured or rejected the call
    #[error("Integration error: {0}")]
    Integration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("template 42".to_string());
        assert_eq!(err.to_string(), "Not found: template 42");
    }

    #[test]
    fn test_error_display_page_not_found() {
        let id = Uuid::nil();
        let err = Error::PageNotFound(id);
        assert_eq!(err.to_string(), format!("Landing page not found: {}", id));
    }

    #[test]
    fn test_error_display_lead_not_found() {
        let id = Uuid::new_v4();
        let err = Error::LeadNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("slug taken".to_string());
        assert_eq!(err.to_string(), "Conflict: slug taken");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("editor role required".to_string());
        assert_eq!(err.to_string(), "Forbidden: editor role required");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
