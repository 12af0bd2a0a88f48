//! Google OAuth connect flow.
//!
//! The authorize endpoint hands the dashboard a consent URL; Google calls
//! back with a code that is exchanged and stored per user. The callback
//! renders a small self-closing HTML page since it lands in a popup window.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use pagelift_core::GoogleConnectionStatus;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the consent URL for the caller.
///
/// `GET /api/admin/google/oauth/authorize`
pub async fn authorize(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let google = state.google.as_ref().ok_or_else(|| {
        ApiError::not_configured(
            "Google integration not configured. Set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, \
             and GOOGLE_REDIRECT_URI.",
        )
    })?;

    let auth_url = google.authorization_url(&user.id.to_string());

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "authUrl": auth_url },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn result_page(title: &str, heading: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{heading}</h1>\n<p>{body}</p>\n\
         <button onclick=\"window.close()\">Close Window</button>\n\
         <script>setTimeout(() => window.close(), 3000);</script>\n\
         </body>\n</html>",
    ))
}

/// Handle the Google redirect: exchange the code and store the tokens.
///
/// `GET /api/admin/google/oauth/callback` (public; Google calls it)
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    let failure = |detail: &str| {
        result_page(
            "Google OAuth Error",
            "Connection Failed",
            &format!(
                "There was an error connecting your Google account. {}",
                pagelift_core::page_html::escape_html(detail)
            ),
        )
    };

    if let Some(err) = &query.error {
        return failure(err);
    }
    let Some(code) = query.code.as_deref() else {
        return failure("Authorization code not provided.");
    };
    let Some(user_id) = query.state.as_deref().and_then(|s| s.parse::<Uuid>().ok()) else {
        return failure("Invalid state parameter.");
    };
    let Some(google) = state.google.as_ref() else {
        return failure("Google integration is not configured.");
    };

    match google.exchange_code(code).await {
        Ok(tokens) => {
            if let Err(e) = state.db.google_credentials.upsert(user_id, &tokens).await {
                error!(
                    subsystem = "api",
                    component = "google_oauth",
                    op = "callback",
                    user_id = %user_id,
                    error = %e,
                    "Failed to store Google tokens"
                );
                return failure("Could not store credentials.");
            }
            info!(
                subsystem = "api",
                component = "google_oauth",
                op = "callback",
                user_id = %user_id,
                "Google account connected"
            );
            result_page(
                "Google OAuth Success",
                "Google Account Connected!",
                "Your Google account has been connected. You can now access Search Console \
                 and Analytics data.",
            )
        }
        Err(e) => failure(&e.to_string()),
    }
}

/// Report whether the caller has a connected Google account.
///
/// `GET /api/admin/google/oauth/status`
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = match state.db.google_credentials.get(user.id).await? {
        Some(credential) => GoogleConnectionStatus {
            connected: true,
            is_expired: Some(credential.is_expired(Utc::now())),
            token_expiry: Some(credential.token_expiry),
            scope: Some(credential.scope),
            connected_at: Some(credential.created_at),
            last_updated: Some(credential.updated_at),
        },
        None => GoogleConnectionStatus {
            connected: false,
            token_expiry: None,
            is_expired: None,
            scope: None,
            connected_at: None,
            last_updated: None,
        },
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": status,
    })))
}

/// Delete the caller's stored Google tokens.
///
/// `DELETE /api/admin/google/oauth/disconnect`
pub async fn disconnect(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.google_credentials.delete(user.id).await? {
        return Err(ApiError::not_found(
            "NOT_CONNECTED",
            "No Google account connected",
        ));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Google account disconnected successfully",
    })))
}
