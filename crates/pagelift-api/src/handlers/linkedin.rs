//! LinkedIn connect flow and post publishing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{error, info};

use pagelift_core::defaults::MAX_LINKEDIN_POST_LEN;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Start the LinkedIn OAuth flow: issue a CSRF state and hand back the
/// authorization URL.
///
/// `GET /api/admin/linkedin/oauth/authorize`
pub async fn authorize(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let linkedin = state.linkedin.as_ref().ok_or_else(|| {
        ApiError::not_configured(
            "LinkedIn integration not configured. Set LINKEDIN_CLIENT_ID, \
             LINKEDIN_CLIENT_SECRET, and LINKEDIN_REDIRECT_URI.",
        )
    })?;

    let csrf_state = state.oauth_states.issue(user.id);
    let url = linkedin.authorization_url(&csrf_state);

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "authorizationUrl": url },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Handle the LinkedIn redirect and store tokens + profile identity.
/// Redirects back to the dashboard with success/error query flags.
///
/// `GET /api/admin/linkedin/oauth/callback` (public; LinkedIn calls it)
pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Redirect {
    let dashboard = format!("{}/linkedin", state.config.cors_origin.trim_end_matches('/'));
    let fail = |reason: &str| {
        Redirect::to(&format!(
            "{}?error={}",
            dashboard,
            urlencoding::encode(reason)
        ))
    };

    if let Some(err) = &query.error {
        let detail = query.error_description.as_deref().unwrap_or(err);
        return fail(detail);
    }

    let Some(user_id) = query
        .state
        .as_deref()
        .and_then(|s| state.oauth_states.take(s))
    else {
        return fail("Invalid state parameter");
    };
    let Some(code) = query.code.as_deref() else {
        return fail("Authorization code not provided");
    };
    let Some(linkedin) = state.linkedin.as_ref() else {
        return fail("LinkedIn integration not configured");
    };

    let outcome = async {
        let tokens = linkedin.exchange_code(code).await?;
        let profile = linkedin.user_profile(&tokens.access_token).await?;
        let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);
        state
            .db
            .linkedin
            .upsert_tokens(
                user_id,
                &tokens.access_token,
                tokens.refresh_token.as_deref(),
                expires_at,
                tokens.scope.as_deref(),
                &profile,
            )
            .await?;
        Ok::<(), pagelift_core::Error>(())
    }
    .await;

    match outcome {
        Ok(()) => {
            info!(
                subsystem = "api",
                component = "linkedin",
                op = "callback",
                user_id = %user_id,
                "LinkedIn account connected"
            );
            Redirect::to(&format!("{}?success=true", dashboard))
        }
        Err(e) => {
            error!(
                subsystem = "api",
                component = "linkedin",
                op = "callback",
                user_id = %user_id,
                error = %e,
                "LinkedIn connect failed"
            );
            fail(&e.to_string())
        }
    }
}

/// Report whether the caller has a connected LinkedIn account.
///
/// `GET /api/admin/linkedin/status`
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let data = match state.db.linkedin.get_connection(user.id).await? {
        Some(connection) => serde_json::json!({
            "connected": true,
            "expired": connection.is_expired(Utc::now()),
            "linkedinUserName": connection.linkedin_user_name,
            "linkedinUserEmail": connection.linkedin_user_email,
            "connectedAt": connection.created_at,
        }),
        None => serde_json::json!({ "connected": false }),
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}

/// Delete the caller's LinkedIn connection.
///
/// `POST /api/admin/linkedin/disconnect`
pub async fn disconnect(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.linkedin.delete_tokens(user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "LinkedIn account disconnected successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPostRequest {
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// Publish a post to LinkedIn and record it.
///
/// `POST /api/admin/linkedin/posts`
pub async fn publish_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PublishPostRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let content = req.content.as_deref().unwrap_or("").trim().to_string();
    if content.is_empty() {
        return Err(ApiError::bad_request(
            "VALIDATION_ERROR",
            "Post content is required",
        ));
    }
    if content.chars().count() > MAX_LINKEDIN_POST_LEN {
        return Err(ApiError::bad_request(
            "VALIDATION_ERROR",
            format!(
                "Post content exceeds {} character limit",
                MAX_LINKEDIN_POST_LEN
            ),
        ));
    }

    let linkedin = state.linkedin.as_ref().ok_or_else(|| {
        ApiError::not_configured("LinkedIn integration not configured on this server")
    })?;

    let connection = state
        .db
        .linkedin
        .get_connection(user.id)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized(
                "LINKEDIN_NOT_CONNECTED",
                "LinkedIn account not connected. Please connect your LinkedIn account first.",
            )
        })?;

    if connection.is_expired(Utc::now()) {
        return Err(ApiError::unauthorized(
            "LINKEDIN_TOKEN_EXPIRED",
            "LinkedIn token expired. Please reconnect your LinkedIn account.",
        ));
    }

    let published = linkedin
        .publish_post(
            &connection.access_token,
            &connection.linkedin_user_id,
            &content,
            req.image_url.as_deref(),
        )
        .await?;

    let post_url = format!("https://www.linkedin.com/feed/update/{}", published.urn);
    let saved = state
        .db
        .linkedin
        .save_post(
            user.id,
            &published.id,
            &content,
            Some(&post_url),
            req.image_url.as_deref(),
            &published.urn,
        )
        .await?;

    info!(
        subsystem = "api",
        component = "linkedin",
        op = "publish_post",
        user_id = %user.id,
        urn = %published.urn,
        "LinkedIn post published"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Post published successfully",
            "data": {
                "post": {
                    "id": saved.id,
                    "linkedinPostId": saved.linkedin_post_id,
                    "content": saved.post_content,
                    "postUrl": saved.post_url,
                    "imageUrl": saved.image_url,
                    "publishedAt": saved.published_at,
                }
            }
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// The caller's post history, newest first.
///
/// `GET /api/admin/linkedin/posts`
pub async fn post_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let posts = state.db.linkedin.post_history(user.id, limit, offset).await?;
    let total = state.db.linkedin.post_count(user.id).await?;
    let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "posts": posts,
            "pagination": {
                "page": page,
                "limit": limit,
                "totalCount": total,
                "totalPages": total_pages,
            }
        }
    })))
}

/// Post volume stats for the caller.
///
/// `GET /api/admin/linkedin/stats`
pub async fn post_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let total = state.db.linkedin.post_count(user.id).await?;
    let last_30_days = state.db.linkedin.post_count_since_days(user.id, 30).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "totalPosts": total,
            "postsLast30Days": last_30_days,
        }
    })))
}
