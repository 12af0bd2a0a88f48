//! Public surface: published landing pages and the lead-capture pipeline.
//!
//! Everything here is reachable without authentication and sits behind the
//! permissive CORS policy, so inputs are treated as hostile: honeypot check,
//! per-page required-field validation, sanitization, and rate limiting all
//! run before a row is written.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::Json;
use tracing::info;

use pagelift_core::defaults::{
    MAX_LEAD_FIELD_LEN, MAX_MESSAGE_LEN, MAX_PHONE_LEN, MAX_URL_LEN, MAX_USER_AGENT_LEN,
};
use pagelift_core::sanitize::{client_ip, is_valid_email, sanitize_text};
use pagelift_core::{
    render_landing_page_html, LandingPage, LandingPageRepository, LeadRepository, NewLead,
    PublishStatus, SubmitLeadRequest,
};

use crate::error::{ApiError, FieldError};
use crate::state::AppState;

/// Fetch a published landing page as JSON.
///
/// `GET /api/public/landing-pages/:slug`
pub async fn get_public_landing_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = fetch_published(&state, &slug).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "landingPage": page },
    })))
}

/// Serve the rendered HTML document for a published landing page.
///
/// `GET /api/public/pages/:slug`
pub async fn get_public_page_html(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    // Allow the published URL's `{slug}.html` form as well.
    let slug = slug.strip_suffix(".html").unwrap_or(&slug);
    let page = fetch_published(&state, slug).await?;
    Ok(Html(render_landing_page_html(&page)))
}

async fn fetch_published(state: &AppState, slug: &str) -> Result<LandingPage, ApiError> {
    state
        .db
        .landing_pages
        .get_published_by_slug(slug)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "LANDING_PAGE_NOT_FOUND",
                "Landing page not found or not published",
            )
        })
}

/// Required-field failures derived from the page's form configuration.
fn missing_required_fields(req: &SubmitLeadRequest, page: &LandingPage) -> Vec<FieldError> {
    page.form_fields
        .fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| {
            req.field_value(&f.name)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .map(|f| FieldError::new(f.name.clone(), format!("{} is required", f.label)))
        .collect()
}

/// Capture a lead submitted from a published landing page.
///
/// `POST /api/public/leads`
pub async fn submit_lead(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<SubmitLeadRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if let Some(limiter) = &state.lead_limiter {
        if limiter.check().is_err() {
            return Err(ApiError::rate_limited());
        }
    }

    // Honeypot: real visitors never see the field, bots fill it.
    if req.website.as_deref().map(str::trim).is_some_and(|v| !v.is_empty()) {
        return Err(ApiError::bad_request("SPAM_DETECTED", "Invalid submission"));
    }

    let landing_page_id = req.landing_page_id.ok_or_else(|| {
        ApiError::validation(
            "Missing required field: landing_page_id",
            vec![FieldError::new(
                "landing_page_id",
                "Landing page ID is required",
            )],
        )
    })?;

    let page = state
        .db
        .landing_pages
        .get(landing_page_id)
        .await?
        .ok_or_else(|| ApiError::not_found("LANDING_PAGE_NOT_FOUND", "Landing page not found"))?;

    if page.publish_status != PublishStatus::Published {
        return Err(ApiError::bad_request(
            "LANDING_PAGE_NOT_PUBLISHED",
            "This landing page is not currently accepting submissions",
        ));
    }

    let missing = missing_required_fields(&req, &page);
    if !missing.is_empty() {
        return Err(ApiError::validation(
            "Required fields are missing",
            missing,
        ));
    }

    if let Some(email) = req.email.as_deref() {
        if !is_valid_email(email.trim()) {
            return Err(ApiError::validation(
                "Invalid email format",
                vec![FieldError::new(
                    "email",
                    "Please provide a valid email address",
                )],
            ));
        }
    }

    let header_str = |name: &str| -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    let ip_address = client_ip(
        header_str("x-forwarded-for").as_deref(),
        header_str("x-real-ip").as_deref(),
        connect_info
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .as_deref(),
    );

    let user_agent = req
        .user_agent
        .clone()
        .or_else(|| header_str("user-agent"));
    let referrer = header_str("referer");

    let lead = NewLead {
        landing_page_id: Some(page.id),
        name: req.name.as_deref().and_then(|v| sanitize_text(v, MAX_LEAD_FIELD_LEN)),
        email: req.email.as_deref().and_then(|v| sanitize_text(v, MAX_LEAD_FIELD_LEN)),
        phone: req.phone.as_deref().and_then(|v| sanitize_text(v, MAX_PHONE_LEN)),
        company: req
            .company
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_LEAD_FIELD_LEN)),
        job_title: req
            .job_title
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_LEAD_FIELD_LEN)),
        message: req
            .message
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_MESSAGE_LEN)),
        source: "landing_page".to_string(),
        source_details: Some(format!("LP: {}", page.slug)),
        referrer_url: req
            .referrer_url
            .as_deref()
            .or(referrer.as_deref())
            .and_then(|v| sanitize_text(v, MAX_URL_LEN)),
        landing_url: req
            .landing_url
            .as_deref()
            .or(referrer.as_deref())
            .and_then(|v| sanitize_text(v, MAX_URL_LEN)),
        user_agent: user_agent
            .as_deref()
            .and_then(|v| sanitize_text(v, MAX_USER_AGENT_LEN)),
        ip_address,
    };

    let email_echo = lead.email.clone();
    let lead_id = state.db.leads.insert(lead).await?;

    info!(
        subsystem = "api",
        component = "lead_capture",
        op = "submit_lead",
        lead_id = %lead_id,
        page_id = %page.id,
        "Lead captured"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Thank you for your submission!",
            "data": {
                "lead_id": lead_id,
                "email": email_echo,
            },
            "redirect_url": null,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pagelift_core::{FormField, FormFields};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn page_with_required_email() -> LandingPage {
        LandingPage {
            id: Uuid::nil(),
            title: "T".to_string(),
            slug: "t".to_string(),
            headline: None,
            subheading: None,
            body_text: None,
            cta_text: "Go".to_string(),
            hero_image_url: None,
            form_fields: FormFields {
                fields: vec![
                    FormField {
                        name: "email".to_string(),
                        label: "Email Address".to_string(),
                        field_type: "email".to_string(),
                        required: true,
                        placeholder: None,
                    },
                    FormField {
                        name: "budget".to_string(),
                        label: "Budget".to_string(),
                        field_type: "text".to_string(),
                        required: true,
                        placeholder: None,
                    },
                ],
            },
            publish_status: PublishStatus::Published,
            published_url: None,
            published_at: None,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn submission() -> SubmitLeadRequest {
        SubmitLeadRequest {
            landing_page_id: Some(Uuid::nil()),
            name: None,
            email: Some("a@b.co".to_string()),
            phone: None,
            company: None,
            job_title: None,
            message: None,
            website: None,
            user_agent: None,
            referrer_url: None,
            landing_url: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_missing_required_custom_field_reported_by_label() {
        let page = page_with_required_email();
        let req = submission();
        let missing = missing_required_fields(&req, &page);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].field, "budget");
        assert!(missing[0].message.contains("Budget"));
    }

    #[test]
    fn test_custom_field_satisfied_via_extra_map() {
        let page = page_with_required_email();
        let mut req = submission();
        req.extra
            .insert("budget".to_string(), serde_json::json!("10k"));
        assert!(missing_required_fields(&req, &page).is_empty());
    }

    #[test]
    fn test_whitespace_only_value_counts_as_missing() {
        let page = page_with_required_email();
        let mut req = submission();
        req.extra
            .insert("budget".to_string(), serde_json::json!("   "));
        let missing = missing_required_fields(&req, &page);
        assert_eq!(missing.len(), 1);
    }
}
