//! GA4 property management, sync, and snapshot read endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use pagelift_core::defaults::PAGE_LIMIT;
use pagelift_core::{AddGa4PropertyRequest, DateRange};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{lookback_days, parse_date_or, range_from_days};
use crate::services;
use crate::state::AppState;

/// List the caller's registered GA4 properties.
///
/// `GET /api/admin/analytics/properties`
pub async fn list_properties(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let properties = state.db.ga4.list_properties(user.id).await?;
    let count = properties.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "properties": properties,
            "count": count,
        }
    })))
}

/// Register (or refresh) a GA4 property.
///
/// `POST /api/admin/analytics/properties`
pub async fn add_property(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddGa4PropertyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.property_id.trim().is_empty() {
        return Err(ApiError::bad_request(
            "VALIDATION_ERROR",
            "Property ID is required",
        ));
    }

    let property = state.db.ga4.upsert_property(user.id, &req).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "property": property,
            "message": "GA4 property added successfully",
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub property_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Which snapshots to refresh; defaults to all three.
    pub data_types: Option<Vec<String>>,
}

/// Sync GA4 data (daily metrics, page views, events) into the snapshot
/// tables.
///
/// `POST /api/admin/analytics/sync`
pub async fn sync_analytics(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SyncRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let property_id = req
        .property_id
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", "Property ID is required"))?;

    let (default_start, default_end) = range_from_days(lookback_days(None));
    let start = parse_date_or(req.start_date.as_deref(), default_start);
    let end = parse_date_or(req.end_date.as_deref(), default_end);

    let data_types = req.data_types.unwrap_or_else(|| {
        vec![
            "metrics".to_string(),
            "pageViews".to_string(),
            "events".to_string(),
        ]
    });

    let mut metrics = None;
    let mut page_views = None;
    let mut events = None;

    if data_types.iter().any(|t| t == "metrics") {
        metrics = Some(services::sync_ga4_metrics(&state, user.id, property_id, start, end).await?);
    }
    if data_types.iter().any(|t| t == "pageViews") {
        page_views =
            Some(services::sync_ga4_page_views(&state, user.id, property_id, start, end).await?);
    }
    if data_types.iter().any(|t| t == "events") {
        events = Some(services::sync_ga4_events(&state, user.id, property_id, start, end).await?);
    }

    let total_rows = metrics.as_ref().map(|s| s.rows_stored).unwrap_or(0)
        + page_views.as_ref().map(|s| s.rows_stored).unwrap_or(0)
        + events.as_ref().map(|s| s.rows_stored).unwrap_or(0);

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "results": {
                "metrics": metrics,
                "pageViews": page_views,
                "events": events,
            },
            "totalRowsStored": total_rows,
            "message": format!("Successfully synced {} records", total_rows),
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    pub property_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

impl SnapshotQuery {
    fn property_id(&self) -> Result<&str, ApiError> {
        self.property_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", "Property ID is required"))
    }

    fn range(&self) -> (chrono::NaiveDate, chrono::NaiveDate) {
        let (default_start, default_end) = range_from_days(lookback_days(None));
        (
            parse_date_or(self.start_date.as_deref(), default_start),
            parse_date_or(self.end_date.as_deref(), default_end),
        )
    }
}

/// Mirrored daily metrics for a property.
///
/// `GET /api/admin/analytics/metrics`
pub async fn get_metrics(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let property_id = query.property_id()?;
    let (start, end) = query.range();

    let metrics = state.db.ga4.get_metrics(property_id, start, end).await?;
    let count = metrics.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "metrics": metrics,
            "count": count,
            "dateRange": DateRange { start_date: start, end_date: end },
        }
    })))
}

/// Mirrored page views for a property.
///
/// `GET /api/admin/analytics/page-views`
pub async fn get_page_views(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let property_id = query.property_id()?;
    let (start, end) = query.range();
    let limit = query.limit.unwrap_or(PAGE_LIMIT * 2);

    let page_views = state
        .db
        .ga4
        .get_page_views(property_id, start, end, limit)
        .await?;
    let count = page_views.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "pageViews": page_views,
            "count": count,
            "dateRange": DateRange { start_date: start, end_date: end },
        }
    })))
}

/// Mirrored events for a property.
///
/// `GET /api/admin/analytics/events`
pub async fn get_events(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let property_id = query.property_id()?;
    let (start, end) = query.range();
    let limit = query.limit.unwrap_or(PAGE_LIMIT * 2);

    let events = state
        .db
        .ga4
        .get_events(property_id, start, end, limit)
        .await?;
    let count = events.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "events": events,
            "count": count,
            "dateRange": DateRange { start_date: start, end_date: end },
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub property_id: Option<String>,
    pub days: Option<i64>,
}

/// Aggregated dashboard summary for a property.
///
/// `GET /api/admin/analytics/ga4-dashboard`
pub async fn ga4_dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let property_id = query
        .property_id
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", "Property ID is required"))?;

    let (start, end) = range_from_days(lookback_days(query.days));

    let summary = state.db.ga4.summary_totals(property_id, start, end).await?;
    let top_pages = state.db.ga4.top_pages(property_id, start, end, 10).await?;
    let top_events = state.db.ga4.top_events(property_id, start, end, 10).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "summary": summary,
            "topPages": top_pages,
            "topEvents": top_events,
            "dateRange": DateRange { start_date: start, end_date: end },
        }
    })))
}
