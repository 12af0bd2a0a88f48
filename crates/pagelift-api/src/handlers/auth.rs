//! Login and token verification endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use pagelift_core::sanitize::is_valid_email;
use pagelift_core::UserRepository;

use crate::auth::{issue_token, verify_password, AuthUser};
use crate::error::{ApiError, FieldError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Authenticate with email + password and receive a session token.
///
/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same 401 so the endpoint
/// doesn't leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut details = Vec::new();
    if req.email.as_deref().unwrap_or("").is_empty() {
        details.push(FieldError::new("email", "Email is required"));
    }
    if req.password.as_deref().unwrap_or("").is_empty() {
        details.push(FieldError::new("password", "Password is required"));
    }
    if !details.is_empty() {
        return Err(ApiError::validation(
            "Email and password are required",
            details,
        ));
    }

    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if !is_valid_email(&email) {
        return Err(ApiError::validation(
            "Invalid email format",
            vec![FieldError::new("email", "Invalid email format")],
        ));
    }

    let invalid_credentials =
        || ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password");

    let user = state
        .db
        .users
        .find_credentials(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password_hash) {
        warn!(
            subsystem = "api",
            component = "auth",
            op = "login",
            email = %email,
            "Failed login attempt"
        );
        return Err(invalid_credentials());
    }

    let token = issue_token(&state.config.jwt_secret, &user)?;
    state.db.users.touch(user.id).await?;

    info!(
        subsystem = "api",
        component = "auth",
        op = "login",
        user_id = %user.id,
        "User logged in"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": token,
            "user": {
                "id": user.id,
                "email": user.email,
                "name": user.name,
                "role": user.role,
            }
        }
    })))
}

/// Confirm the caller's token is valid and echo the principal.
///
/// `GET /api/auth/verify`
pub async fn verify(user: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Token is valid",
        "data": {
            "valid": true,
            "user": {
                "id": user.id,
                "email": user.email,
                "role": user.role,
            }
        }
    }))
}
