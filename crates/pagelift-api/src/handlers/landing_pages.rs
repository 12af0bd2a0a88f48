//! Landing page management endpoints.
//!
//! Create/update requests are validated up front (field lengths, slug
//! shape, form configuration) so the repository only ever sees well-formed
//! payloads; the slug unique constraint is the one thing left to the
//! database.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use pagelift_core::defaults::{
    MAX_CTA_LEN, MAX_HEADLINE_LEN, MAX_SLUG_LEN, MAX_SUBHEADING_LEN, MAX_TITLE_LEN, MAX_URL_LEN,
};
use pagelift_core::sanitize::is_valid_slug;
use pagelift_core::{
    CreateLandingPageRequest, FormFields, LandingPageRepository, ListLandingPagesRequest,
    PageOrderBy, SortOrder, UpdateLandingPageRequest, UserRole,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::state::AppState;

const EDIT_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::Editor];

fn check_optional_len(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    max: usize,
    label: &str,
) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.push(FieldError::new(
                field,
                format!("{} must not exceed {} characters", label, max),
            ));
        }
    }
}

fn validate_title(errors: &mut Vec<FieldError>, title: &str) {
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title must be a non-empty string"));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(FieldError::new(
            "title",
            format!("Title must not exceed {} characters", MAX_TITLE_LEN),
        ));
    }
}

fn validate_slug(errors: &mut Vec<FieldError>, slug: &str) {
    if slug.trim().is_empty() {
        errors.push(FieldError::new("slug", "Slug must be a non-empty string"));
    } else if slug.chars().count() > MAX_SLUG_LEN {
        errors.push(FieldError::new(
            "slug",
            format!("Slug must not exceed {} characters", MAX_SLUG_LEN),
        ));
    } else if !is_valid_slug(slug) {
        errors.push(FieldError::new(
            "slug",
            "Slug must contain only lowercase letters, numbers, and hyphens \
             (cannot start/end with hyphen)",
        ));
    }
}

fn validate_form_fields(errors: &mut Vec<FieldError>, form: &FormFields, require_email: bool) {
    if form.fields.is_empty() {
        errors.push(FieldError::new(
            "form_fields",
            "form_fields must contain at least one field",
        ));
        return;
    }

    if require_email && !form.has_email_field() {
        errors.push(FieldError::new(
            "form_fields",
            "form_fields must contain at least one email field for lead capture",
        ));
    }

    for (idx, field) in form.fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            errors.push(FieldError::new(
                format!("form_fields.fields[{}].name", idx),
                "Each field must have a \"name\" property (string)",
            ));
        }
        if field.label.trim().is_empty() {
            errors.push(FieldError::new(
                format!("form_fields.fields[{}].label", idx),
                "Each field must have a \"label\" property (string)",
            ));
        }
        if field.field_type.trim().is_empty() {
            errors.push(FieldError::new(
                format!("form_fields.fields[{}].type", idx),
                "Each field must have a \"type\" property (string)",
            ));
        }
    }
}

fn validate_create(req: &CreateLandingPageRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    validate_title(&mut errors, &req.title);
    validate_slug(&mut errors, &req.slug);
    check_optional_len(
        &mut errors,
        "headline",
        req.headline.as_deref(),
        MAX_HEADLINE_LEN,
        "Headline",
    );
    check_optional_len(
        &mut errors,
        "subheading",
        req.subheading.as_deref(),
        MAX_SUBHEADING_LEN,
        "Subheading",
    );
    check_optional_len(
        &mut errors,
        "cta_text",
        req.cta_text.as_deref(),
        MAX_CTA_LEN,
        "CTA text",
    );
    check_optional_len(
        &mut errors,
        "hero_image_url",
        req.hero_image_url.as_deref(),
        MAX_URL_LEN,
        "Hero image URL",
    );
    if let Some(form) = &req.form_fields {
        validate_form_fields(&mut errors, form, true);
    }
    errors
}

fn validate_update(req: &UpdateLandingPageRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(title) = &req.title {
        validate_title(&mut errors, title);
    }
    if let Some(slug) = &req.slug {
        validate_slug(&mut errors, slug);
    }
    check_optional_len(
        &mut errors,
        "headline",
        req.headline.as_deref(),
        MAX_HEADLINE_LEN,
        "Headline",
    );
    check_optional_len(
        &mut errors,
        "subheading",
        req.subheading.as_deref(),
        MAX_SUBHEADING_LEN,
        "Subheading",
    );
    check_optional_len(
        &mut errors,
        "cta_text",
        req.cta_text.as_deref(),
        MAX_CTA_LEN,
        "CTA text",
    );
    check_optional_len(
        &mut errors,
        "hero_image_url",
        req.hero_image_url.as_deref(),
        MAX_URL_LEN,
        "Hero image URL",
    );
    if let Some(form) = &req.form_fields {
        validate_form_fields(&mut errors, form, false);
    }
    errors
}

/// Create a landing page (draft).
///
/// `POST /api/admin/landing-pages` — admin/editor
pub async fn create_landing_page(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateLandingPageRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    user.require_role(&EDIT_ROLES)?;

    let errors = validate_create(&req);
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let page = state.db.landing_pages.create(user.id, req).await?;
    info!(
        subsystem = "api",
        component = "landing_pages",
        op = "create",
        page_id = %page.id,
        user_id = %user.id,
        "Landing page created"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "data": page,
            "message": "Landing page created successfully",
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListPagesQuery {
    pub publish_status: Option<String>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    #[serde(rename = "orderDir")]
    pub order_dir: Option<String>,
}

/// List landing pages with filters and pagination.
///
/// `GET /api/admin/landing-pages`
pub async fn list_landing_pages(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListPagesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let publish_status = match query.publish_status.as_deref() {
        Some(raw) => Some(pagelift_core::PublishStatus::parse(raw).ok_or_else(|| {
            ApiError::validation(
                "Invalid publish status",
                vec![FieldError::new(
                    "publish_status",
                    "Status must be one of: draft, published, archived",
                )],
            )
        })?),
        None => None,
    };

    let req = ListLandingPagesRequest {
        publish_status,
        created_by: query.created_by,
        search: query.search.clone(),
        limit: query.limit,
        offset: query.offset,
        order_by: query
            .order_by
            .as_deref()
            .map(PageOrderBy::parse_or_default)
            .unwrap_or_default(),
        order_dir: query
            .order_dir
            .as_deref()
            .and_then(SortOrder::parse)
            .unwrap_or_default(),
    };

    let pages = state.db.landing_pages.list(req).await?;
    let count = pages.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": pages,
        "count": count,
    })))
}

/// Fetch one landing page.
///
/// `GET /api/admin/landing-pages/:id`
pub async fn get_landing_page(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .db
        .landing_pages
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": page,
    })))
}

/// Update a landing page. Non-admins may only update their own pages.
///
/// `PUT /api/admin/landing-pages/:id` — admin/editor
pub async fn update_landing_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLandingPageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_role(&EDIT_ROLES)?;

    let errors = validate_update(&req);
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let existing = state
        .db
        .landing_pages
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    if !user.can_modify(existing.created_by) {
        return Err(ApiError::forbidden(
            "You do not have permission to edit this landing page",
        ));
    }

    let updated = state
        .db
        .landing_pages
        .update(id, req)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": updated,
        "message": "Landing page updated successfully",
    })))
}

/// Delete a landing page. Non-admins may only delete their own pages.
///
/// `DELETE /api/admin/landing-pages/:id` — admin/editor
pub async fn delete_landing_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_role(&EDIT_ROLES)?;

    let existing = state
        .db
        .landing_pages
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    if !user.can_modify(existing.created_by) {
        return Err(ApiError::forbidden(
            "You do not have permission to delete this landing page",
        ));
    }

    if !state.db.landing_pages.delete(id).await? {
        return Err(pagelift_core::Error::PageNotFound(id).into());
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Landing page deleted successfully",
    })))
}

/// Publish a landing page.
///
/// `POST /api/admin/landing-pages/:id/publish` — admin/editor
///
/// The page is served from the public pages path; when a WordPress site is
/// configured the page is cross-published there and the WordPress permalink
/// wins as the published URL. A WordPress failure falls back to the local
/// URL rather than failing the publish.
pub async fn publish_landing_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_role(&EDIT_ROLES)?;

    let existing = state
        .db
        .landing_pages
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    if !user.can_modify(existing.created_by) {
        return Err(ApiError::forbidden(
            "You do not have permission to publish this landing page",
        ));
    }

    let mut published_url = format!(
        "{}/pages/{}.html",
        state.config.public_url.trim_end_matches('/'),
        existing.slug
    );

    if let Some(wordpress) = &state.wordpress {
        match wordpress.publish_page(&existing).await {
            Ok(post) => published_url = post.link,
            Err(e) => warn!(
                subsystem = "api",
                component = "landing_pages",
                op = "publish",
                page_id = %id,
                error = %e,
                "WordPress cross-publish failed; using local URL"
            ),
        }
    }

    let published = state
        .db
        .landing_pages
        .publish(id, &published_url)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    info!(
        subsystem = "api",
        component = "landing_pages",
        op = "publish",
        page_id = %id,
        user_id = %user.id,
        "Landing page published"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "data": published,
        "message": "Landing page published successfully",
    })))
}

/// Per-status page counts for the caller.
///
/// `GET /api/admin/landing-pages/stats`
pub async fn landing_page_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let counts = state
        .db
        .landing_pages
        .count_by_status(Some(user.id))
        .await?;

    let total: i64 = counts.iter().map(|c| c.count).sum();
    let mut by_status = serde_json::Map::new();
    for c in &counts {
        by_status.insert(
            c.status.as_str().to_string(),
            serde_json::json!(c.count),
        );
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "countByStatus": by_status,
            "total": total,
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelift_core::FormField;

    fn base_create() -> CreateLandingPageRequest {
        CreateLandingPageRequest {
            title: "Spring Sale".to_string(),
            slug: "spring-sale".to_string(),
            headline: None,
            subheading: None,
            body_text: None,
            cta_text: None,
            hero_image_url: None,
            form_fields: None,
        }
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(validate_create(&base_create()).is_empty());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut req = base_create();
        req.title = "   ".to_string();
        let errors = validate_create(&req);
        assert!(errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn test_overlong_title_rejected() {
        let mut req = base_create();
        req.title = "x".repeat(MAX_TITLE_LEN + 1);
        let errors = validate_create(&req);
        assert!(errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn test_bad_slug_rejected() {
        let mut req = base_create();
        req.slug = "Bad Slug!".to_string();
        let errors = validate_create(&req);
        assert!(errors.iter().any(|e| e.field == "slug"));
    }

    #[test]
    fn test_form_without_email_field_rejected() {
        let mut req = base_create();
        req.form_fields = Some(FormFields {
            fields: vec![FormField {
                name: "name".to_string(),
                label: "Name".to_string(),
                field_type: "text".to_string(),
                required: true,
                placeholder: None,
            }],
        });
        let errors = validate_create(&req);
        assert!(errors
            .iter()
            .any(|e| e.field == "form_fields" && e.message.contains("email")));
    }

    #[test]
    fn test_empty_form_rejected() {
        let mut req = base_create();
        req.form_fields = Some(FormFields { fields: vec![] });
        let errors = validate_create(&req);
        assert!(errors.iter().any(|e| e.field == "form_fields"));
    }

    #[test]
    fn test_form_field_missing_label_rejected() {
        let mut req = base_create();
        req.form_fields = Some(FormFields {
            fields: vec![FormField {
                name: "email".to_string(),
                label: "".to_string(),
                field_type: "email".to_string(),
                required: true,
                placeholder: None,
            }],
        });
        let errors = validate_create(&req);
        assert!(errors.iter().any(|e| e.field.contains("label")));
    }

    #[test]
    fn test_update_all_absent_is_valid() {
        assert!(validate_update(&UpdateLandingPageRequest::default()).is_empty());
    }

    #[test]
    fn test_update_form_does_not_require_email_field() {
        let req = UpdateLandingPageRequest {
            form_fields: Some(FormFields {
                fields: vec![FormField {
                    name: "company".to_string(),
                    label: "Company".to_string(),
                    field_type: "text".to_string(),
                    required: false,
                    placeholder: None,
                }],
            }),
            ..Default::default()
        };
        assert!(validate_update(&req).is_empty());
    }
}
