//! Landing page template endpoints.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use pagelift_core::TemplateRepository;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// List active templates.
///
/// `GET /api/admin/templates`
pub async fn list_templates(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let templates = state.db.templates.list_active().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": templates,
    })))
}

/// Fetch one template by id.
///
/// `GET /api/admin/templates/:id`
pub async fn get_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let template = state
        .db
        .templates
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("TEMPLATE_NOT_FOUND", "Template not found"))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": template,
    })))
}
