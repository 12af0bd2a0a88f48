//! Lead inbox endpoints: list, detail, triage, assignment, CSV export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use pagelift_core::defaults::{LEAD_PAGE_LIMIT, MAX_PAGE_LIMIT};
use pagelift_core::{
    csv, AssignedFilter, LeadExportFilter, LeadOrderBy, LeadRepository, LeadStatus,
    ListLeadsRequest, Pagination, SortOrder, UserRepository,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::state::AppState;

/// Parse a date filter accepted as either RFC 3339 or `YYYY-MM-DD`.
/// A bare date becomes midnight UTC; `date_to` bare dates extend to the end
/// of that day so the filter is inclusive.
fn parse_date_filter(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(DateTime::from_naive_utc_and_offset(time, Utc))
}

fn parse_status_param(status: &str) -> Result<LeadStatus, ApiError> {
    LeadStatus::parse(status).ok_or_else(|| {
        let allowed = LeadStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::validation(
            "Invalid status value",
            vec![FieldError::new(
                "status",
                format!("Status must be one of: {}", allowed),
            )],
        )
    })
}

fn parse_assigned_filter(raw: &str) -> Result<AssignedFilter, ApiError> {
    match raw {
        "unassigned" => Ok(AssignedFilter::Unassigned),
        "assigned" => Ok(AssignedFilter::Assigned),
        other => other.parse::<Uuid>().map(AssignedFilter::User).map_err(|_| {
            ApiError::validation(
                "Invalid assignment filter",
                vec![FieldError::new(
                    "assigned_to",
                    "Must be \"assigned\", \"unassigned\", or a user id",
                )],
            )
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListLeadsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub landing_page_id: Option<Uuid>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub assigned_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// List leads with filtering, sorting, and pagination.
///
/// `GET /api/admin/leads`
pub async fn list_leads(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(LEAD_PAGE_LIMIT);
    if page < 1 || limit < 1 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::validation(
            "Invalid pagination parameters",
            vec![
                FieldError::new("page", "Page must be a positive integer"),
                FieldError::new(
                    "limit",
                    format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT),
                ),
            ],
        ));
    }

    let sort_by = match query.sort_by.as_deref() {
        Some(raw) => LeadOrderBy::parse(raw).ok_or_else(|| {
            ApiError::validation(
                "Invalid sort field",
                vec![FieldError::new(
                    "sort_by",
                    "Sort field must be one of: name, email, created_at, status",
                )],
            )
        })?,
        None => LeadOrderBy::default(),
    };

    let sort_order = match query.sort_order.as_deref() {
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
            ApiError::validation(
                "Invalid sort order",
                vec![FieldError::new(
                    "sort_order",
                    "Sort order must be \"asc\" or \"desc\"",
                )],
            )
        })?,
        None => SortOrder::Desc,
    };

    let status = query
        .status
        .as_deref()
        .map(parse_status_param)
        .transpose()?;
    let assigned_to = query
        .assigned_to
        .as_deref()
        .map(parse_assigned_filter)
        .transpose()?;

    let req = ListLeadsRequest {
        page,
        limit,
        search: query.search.clone(),
        landing_page_id: query.landing_page_id,
        status,
        date_from: query
            .date_from
            .as_deref()
            .and_then(|v| parse_date_filter(v, false)),
        date_to: query
            .date_to
            .as_deref()
            .and_then(|v| parse_date_filter(v, true)),
        assigned_to,
        sort_by,
        sort_order,
    };

    let (leads, total) = state.db.leads.list(req).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": leads,
        "pagination": Pagination::new(page, limit, total),
        "filters": {
            "search": query.search,
            "landing_page_id": query.landing_page_id,
            "status": query.status,
            "date_from": query.date_from,
            "date_to": query.date_to,
            "assigned_to": query.assigned_to,
        },
        "sort": {
            "sort_by": sort_by.column(),
            "sort_order": sort_order.sql().to_lowercase(),
        },
    })))
}

/// Fetch one lead with its joined page and assignee.
///
/// `GET /api/admin/leads/:id`
pub async fn get_lead(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lead = state
        .db
        .leads
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::LeadNotFound(id))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": lead,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Update a lead's triage status.
///
/// `PATCH /api/admin/leads/:id`
pub async fn update_lead_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = parse_status_param(req.status.as_deref().unwrap_or(""))?;

    let updated = state
        .db
        .leads
        .update_status(id, status)
        .await?
        .ok_or(pagelift_core::Error::LeadNotFound(id))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "id": updated.id,
            "status": updated.status,
            "updated_at": updated.updated_at,
        },
        "message": "Lead status updated successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct AssignLeadRequest {
    /// Target user, or null to unassign.
    pub assigned_to: Option<Uuid>,
}

/// Assign a lead to a user, or unassign it with a null body value.
///
/// `PATCH /api/admin/leads/:id/assign`
pub async fn assign_lead(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignLeadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.leads.exists(id).await? {
        return Err(pagelift_core::Error::LeadNotFound(id).into());
    }

    let assigned_user = match req.assigned_to {
        Some(user_id) => Some(
            state
                .db
                .users
                .get_summary(user_id)
                .await?
                .ok_or_else(|| {
                    ApiError::validation(
                        "Invalid user ID",
                        vec![FieldError::new("assigned_to", "User does not exist")],
                    )
                })?,
        ),
        None => None,
    };

    let updated = state
        .db
        .leads
        .assign(id, req.assigned_to)
        .await?
        .ok_or(pagelift_core::Error::LeadNotFound(id))?;

    let message = if assigned_user.is_some() {
        "Lead assigned successfully"
    } else {
        "Lead unassigned successfully"
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "id": updated.id,
            "assigned_to": updated.assigned_to,
            "assigned_at": updated.assigned_at,
            "updated_at": updated.updated_at,
            "assigned_user": assigned_user,
        },
        "message": message,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ExportLeadsQuery {
    pub search: Option<String>,
    pub landing_page_id: Option<Uuid>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Export leads as CSV, honoring the inbox filters.
///
/// `GET /api/admin/leads/export`
pub async fn export_leads(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ExportLeadsQuery>,
) -> Result<Response, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "undefined")
        .map(parse_status_param)
        .transpose()?;

    let filter = LeadExportFilter {
        search: query.search,
        landing_page_id: query.landing_page_id,
        status,
        date_from: query
            .date_from
            .as_deref()
            .and_then(|v| parse_date_filter(v, false)),
        date_to: query
            .date_to
            .as_deref()
            .and_then(|v| parse_date_filter(v, true)),
    };

    let rows = state.db.leads.export_rows(filter).await?;

    let csv_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.name.clone().unwrap_or_default(),
                row.email.clone().unwrap_or_default(),
                row.phone.clone().unwrap_or_default(),
                row.landing_page_title
                    .clone()
                    .unwrap_or_else(|| "Direct".to_string()),
                row.source.clone(),
                row.status.as_str().to_string(),
                row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();

    let document = csv::encode_document(
        &[
            "ID",
            "Name",
            "Email",
            "Phone",
            "Landing Page",
            "Source",
            "Status",
            "Created At",
        ],
        &csv_rows,
    );

    let filename = format!("leads-export-{}.csv", Utc::now().format("%Y-%m-%d"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        document,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_filter_bare_date() {
        let from = parse_date_filter("2026-07-01", false).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-07-01T00:00:00+00:00");
        let to = parse_date_filter("2026-07-01", true).unwrap();
        assert_eq!(to.to_rfc3339(), "2026-07-01T23:59:59+00:00");
    }

    #[test]
    fn test_parse_date_filter_rfc3339() {
        let ts = parse_date_filter("2026-07-01T12:30:00Z", false).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-07-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_date_filter_garbage() {
        assert!(parse_date_filter("not-a-date", false).is_none());
    }

    #[test]
    fn test_parse_assigned_filter() {
        assert_eq!(
            parse_assigned_filter("unassigned").unwrap(),
            AssignedFilter::Unassigned
        );
        assert_eq!(
            parse_assigned_filter("assigned").unwrap(),
            AssignedFilter::Assigned
        );
        let id = Uuid::new_v4();
        assert_eq!(
            parse_assigned_filter(&id.to_string()).unwrap(),
            AssignedFilter::User(id)
        );
        assert!(parse_assigned_filter("nonsense").is_err());
    }

    #[test]
    fn test_parse_status_param() {
        assert_eq!(parse_status_param("closed_won").unwrap(), LeadStatus::ClosedWon);
        assert!(parse_status_param("bogus").is_err());
        assert!(parse_status_param("").is_err());
    }
}
