//! API error type and response envelope.
//!
//! Every failure renders as `{"success": false, "error": {"code", "message",
//! "statusCode", "details"?}}`, matching the success envelope
//! `{"success": true, "data": ...}` used by the handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// A field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error rendered to API clients.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message).with_details(details)
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn rate_limited() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "Too many submissions. Please try again shortly.",
        )
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

/// Map an integration failure onto the status Google reported, when it is
/// recognizable from the message.
fn integration_error(message: String) -> ApiError {
    if message.contains("PERMISSION_DENIED") {
        ApiError::new(StatusCode::FORBIDDEN, "PERMISSION_DENIED", message)
    } else if message.contains("UNAUTHENTICATED") {
        ApiError::unauthorized("UNAUTHENTICATED", message)
    } else if message.contains("NOT_FOUND") {
        ApiError::not_found("NOT_FOUND", message)
    } else {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTEGRATION_ERROR",
            message,
        )
    }
}

impl From<pagelift_core::Error> for ApiError {
    fn from(err: pagelift_core::Error) -> Self {
        use pagelift_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::not_found("NOT_FOUND", msg),
            Error::PageNotFound(id) => ApiError::not_found(
                "LANDING_PAGE_NOT_FOUND",
                format!("Landing page {} not found", id),
            ),
            Error::LeadNotFound(id) => {
                ApiError::not_found("LEAD_NOT_FOUND", format!("Lead {} not found", id))
            }
            Error::InvalidInput(msg) => ApiError::bad_request("VALIDATION_ERROR", msg),
            // Unique-violation conflicts surface as 400s; the only unique
            // constraint user input can trip is the page slug.
            Error::Conflict(msg) => ApiError::bad_request("DUPLICATE_SLUG", msg),
            Error::Unauthorized(msg) => ApiError::unauthorized("UNAUTHORIZED", msg),
            Error::Forbidden(msg) => ApiError::forbidden(msg),
            Error::Config(msg) => ApiError::not_configured(msg),
            Error::Integration(msg) => integration_error(msg),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = serde_json::json!({
            "code": self.code,
            "message": self.message,
            "statusCode": self.status.as_u16(),
        });
        if let Some(details) = &self.details {
            error["details"] = serde_json::json!(details);
        }

        let body = Json(serde_json::json!({
            "success": false,
            "error": error,
        }));

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelift_core::Error;
    use uuid::Uuid;

    #[test]
    fn test_conflict_maps_to_duplicate_slug_400() {
        let err: ApiError = Error::Conflict("A landing page with slug \"x\" already exists".into())
            .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "DUPLICATE_SLUG");
    }

    #[test]
    fn test_lead_not_found_maps_to_404() {
        let err: ApiError = Error::LeadNotFound(Uuid::nil()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "LEAD_NOT_FOUND");
    }

    #[test]
    fn test_integration_permission_denied_maps_to_403() {
        let err: ApiError =
            Error::Integration("GA4 runReport failed (403): PERMISSION_DENIED".into()).into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_integration_unauthenticated_maps_to_401() {
        let err: ApiError =
            Error::Integration("GA4 runReport failed (401): UNAUTHENTICATED".into()).into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_generic_integration_maps_to_500() {
        let err: ApiError = Error::Integration("connection reset".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "INTEGRATION_ERROR");
    }

    #[test]
    fn test_database_error_maps_to_500() {
        let err: ApiError = Error::Internal("boom".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "INTERNAL_ERROR");
    }
}
