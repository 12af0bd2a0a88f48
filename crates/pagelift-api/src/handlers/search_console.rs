//! Search Console endpoints: sites, keyword sync, and keyword analytics.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use pagelift_core::defaults::EXPORT_FETCH_LIMIT;
use pagelift_core::{csv, KeywordFilter, KeywordSortBy};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{lookback_days, parse_date_or, range_from_days};
use crate::services;
use crate::state::AppState;

/// List the Search Console sites visible to the connected account.
///
/// `GET /api/admin/seo/search-console/sites`
pub async fn get_sites(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let access_token = services::access_token_for(&state, user.id).await?;
    let sites = state.search_console.list_sites(&access_token).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "sites": sites,
            "message": "Successfully retrieved Search Console sites",
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncKeywordsRequest {
    pub site_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Sync keyword performance rows from Search Console.
///
/// `POST /api/admin/seo/search-console/sync`
pub async fn sync_keywords(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SyncKeywordsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let site_url = req
        .site_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("VALIDATION_ERROR", "siteUrl is required"))?;

    let (default_start, default_end) = range_from_days(lookback_days(None));
    let start = parse_date_or(req.start_date.as_deref(), default_start);
    let end = parse_date_or(req.end_date.as_deref(), default_end);

    let summary = services::sync_keywords(&state, user.id, site_url, start, end).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "rowsFetched": summary.rows_fetched,
            "rowsStored": summary.rows_stored,
            "message": format!("Successfully synced {} keyword records", summary.rows_stored),
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub url: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl KeywordQuery {
    fn to_filter(&self, limit_default: i64) -> KeywordFilter {
        KeywordFilter {
            start_date: self
                .start_date
                .as_deref()
                .and_then(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").ok()),
            end_date: self
                .end_date
                .as_deref()
                .and_then(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").ok()),
            keyword: self.keyword.clone(),
            url: self.url.clone(),
            limit: self.limit.unwrap_or(limit_default),
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Aggregated keyword performance.
///
/// `GET /api/admin/seo/keywords`
pub async fn get_keywords(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<KeywordQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = query.to_filter(100);
    let keywords = state.db.seo.keyword_performance(&filter).await?;
    let count = keywords.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "keywords": keywords,
            "count": count,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub days: Option<i64>,
}

/// Daily ranking trend for one keyword.
///
/// `GET /api/admin/seo/keywords/:keyword/trend`
pub async fn get_keyword_trend(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(keyword): Path<String>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let trend = state.db.seo.keyword_trend(&keyword, days as i32).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "keyword": keyword,
            "trend": trend,
            "days": days,
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopKeywordsQuery {
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub days: Option<i64>,
}

/// Top keywords by clicks, impressions, or CTR.
///
/// `GET /api/admin/seo/keywords/top`
pub async fn get_top_keywords(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TopKeywordsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let sort_by = query
        .sort_by
        .as_deref()
        .map(KeywordSortBy::parse_or_default)
        .unwrap_or_default();

    let keywords = state
        .db
        .seo
        .top_keywords(query.limit.unwrap_or(10), sort_by, days as i32)
        .await?;
    let count = keywords.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "keywords": keywords,
            "count": count,
            "sortBy": sort_by.column(),
            "days": days,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct DecliningQuery {
    pub limit: Option<i64>,
    pub days: Option<i64>,
}

/// Keywords losing ranking ground across the comparison window.
///
/// `GET /api/admin/seo/keywords/declining`
pub async fn get_declining_keywords(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DecliningQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let keywords = state
        .db
        .seo
        .declining_keywords(query.limit.unwrap_or(10), days as i32)
        .await?;
    let count = keywords.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "keywords": keywords,
            "count": count,
            "days": days,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct IndexingIssuesQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Stored indexing issues.
///
/// `GET /api/admin/seo/indexing-issues`
pub async fn get_indexing_issues(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<IndexingIssuesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let issues = state
        .db
        .seo
        .list_indexing_issues(
            query.status.as_deref(),
            query.severity.as_deref(),
            query.limit.unwrap_or(100),
            query.offset.unwrap_or(0),
        )
        .await?;
    let count = issues.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "issues": issues,
            "count": count,
        }
    })))
}

/// Export aggregated keyword rows as CSV.
///
/// `GET /api/admin/seo/keywords/export`
pub async fn export_keywords(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<KeywordQuery>,
) -> Result<Response, ApiError> {
    let filter = query.to_filter(EXPORT_FETCH_LIMIT);
    let keywords = state.db.seo.keyword_performance(&filter).await?;

    let rows: Vec<Vec<String>> = keywords
        .iter()
        .map(|k| {
            vec![
                k.keyword.clone(),
                k.url.clone().unwrap_or_default(),
                k.total_impressions.to_string(),
                k.total_clicks.to_string(),
                format!("{:.2}", k.avg_ctr),
                k.avg_position
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "N/A".to_string()),
                k.first_seen.to_string(),
                k.last_seen.to_string(),
                k.data_points.to_string(),
            ]
        })
        .collect();

    let document = csv::encode_document(
        &[
            "Keyword",
            "URL",
            "Impressions",
            "Clicks",
            "CTR",
            "Position",
            "First Seen",
            "Last Seen",
            "Data Points",
        ],
        &rows,
    );

    let filename = format!("keywords-{}.csv", Utc::now().format("%Y-%m-%d"));

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
