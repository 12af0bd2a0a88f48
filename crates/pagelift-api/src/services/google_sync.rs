//! Sync services pulling Search Console and GA4 report data into the local
//! snapshot tables.
//!
//! Each sync is a fetch-then-upsert pass: the Google APIs do the report
//! generation, these functions only reshape rows. Access tokens are
//! refreshed transparently when the stored one has expired.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use pagelift_connect::{Ga4ReportRequest, SearchAnalyticsQuery};
use pagelift_core::{Ga4DailyMetrics, Ga4EventRow, Ga4PageViewRow, SeoKeywordUpsert};

use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of one sync pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub rows_fetched: usize,
    pub rows_stored: usize,
}

/// A valid Google access token for the user, refreshing the stored one when
/// it has expired.
pub async fn access_token_for(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    let credential = state
        .db
        .google_credentials
        .get(user_id)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized(
                "GOOGLE_NOT_CONNECTED",
                "Google account not connected. Please authenticate first.",
            )
        })?;

    if !credential.is_expired(chrono::Utc::now()) {
        return Ok(credential.access_token);
    }

    let google = state.google.as_ref().ok_or_else(|| {
        ApiError::not_configured("Google integration is not configured on this server")
    })?;

    let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
        ApiError::unauthorized(
            "TOKEN_EXPIRED",
            "Google authentication expired. Please reconnect your Google account.",
        )
    })?;

    let refreshed = google.refresh(refresh_token).await?;
    state
        .db
        .google_credentials
        .update_access_token(user_id, &refreshed.access_token, refreshed.expiry)
        .await?;

    info!(
        subsystem = "api",
        component = "google_sync",
        op = "refresh_token",
        user_id = %user_id,
        "Google access token refreshed"
    );

    Ok(refreshed.access_token)
}

/// Pull keyword rows from Search Console and upsert them into
/// `seo_keywords`.
///
/// CTR arrives as a fraction and is stored as a percentage; position is
/// rounded to two decimals. All rows of the pass are recorded under the
/// range's end date.
pub async fn sync_keywords(
    state: &AppState,
    user_id: Uuid,
    site_url: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SyncSummary, ApiError> {
    let access_token = access_token_for(state, user_id).await?;

    let query = SearchAnalyticsQuery::keyword_page(
        &start.format("%Y-%m-%d").to_string(),
        &end.format("%Y-%m-%d").to_string(),
    );
    let rows = state
        .search_console
        .query(&access_token, site_url, &query)
        .await?;

    let rows_fetched = rows.len();
    let mut rows_stored = 0;

    for row in rows {
        let Some(keyword) = row.keys.first() else {
            continue;
        };
        let url = row.keys.get(1).cloned();

        let upsert = SeoKeywordUpsert {
            keyword: keyword.clone(),
            url,
            impressions: row.impressions as i64,
            clicks: row.clicks as i64,
            ctr: (row.ctr * 100.0 * 100.0).round() / 100.0,
            position: row.position.map(|p| (p * 100.0).round() / 100.0),
            date: end,
            country: None,
            device: None,
        };
        state.db.seo.upsert_keyword(&upsert).await?;
        rows_stored += 1;
    }

    info!(
        subsystem = "api",
        component = "google_sync",
        op = "sync_keywords",
        user_id = %user_id,
        site_url = %site_url,
        rows_fetched = rows_fetched,
        rows_stored = rows_stored,
        "Keyword sync completed"
    );

    Ok(SyncSummary {
        rows_fetched,
        rows_stored,
    })
}

/// GA4 date dimension format (`20260715`).
fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

/// Sync daily site metrics: a ten-metric report merged with a per-device
/// user breakdown.
pub async fn sync_ga4_metrics(
    state: &AppState,
    user_id: Uuid,
    property_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SyncSummary, ApiError> {
    let access_token = access_token_for(state, user_id).await?;
    let start_s = start.format("%Y-%m-%d").to_string();
    let end_s = end.format("%Y-%m-%d").to_string();

    let metrics_report = state
        .ga4
        .run_report(
            &access_token,
            property_id,
            &Ga4ReportRequest::new(
                &start_s,
                &end_s,
                &["date"],
                &[
                    "activeUsers",
                    "newUsers",
                    "sessions",
                    "engagedSessions",
                    "engagementRate",
                    "averageSessionDuration",
                    "screenPageViewsPerSession",
                    "bounceRate",
                    "conversions",
                    "totalRevenue",
                ],
            ),
        )
        .await?;

    let device_report = state
        .ga4
        .run_report(
            &access_token,
            property_id,
            &Ga4ReportRequest::new(
                &start_s,
                &end_s,
                &["date", "deviceCategory"],
                &["activeUsers"],
            ),
        )
        .await?;

    let mut per_day: HashMap<NaiveDate, Ga4DailyMetrics> = HashMap::new();

    let rows_fetched = metrics_report.rows.len();
    for row in &metrics_report.rows {
        let Some(date) = parse_report_date(row.dimension(0)) else {
            continue;
        };
        per_day.insert(
            date,
            Ga4DailyMetrics {
                property_id: property_id.to_string(),
                date,
                users: row.metric_i64(0),
                new_users: row.metric_i64(1),
                sessions: row.metric_i64(2),
                engaged_sessions: row.metric_i64(3),
                engagement_rate: row.metric_f64(4),
                avg_session_duration: row.metric_f64(5),
                pages_per_session: row.metric_f64(6),
                bounce_rate: row.metric_f64(7),
                conversions: row.metric_i64(8),
                total_revenue: row.metric_f64(9),
                ..Default::default()
            },
        );
    }

    for row in &device_report.rows {
        let Some(date) = parse_report_date(row.dimension(0)) else {
            continue;
        };
        let users = row.metric_i64(0);
        if let Some(metrics) = per_day.get_mut(&date) {
            match row.dimension(1).to_ascii_lowercase().as_str() {
                "desktop" => metrics.desktop_users = users,
                "mobile" => metrics.mobile_users = users,
                "tablet" => metrics.tablet_users = users,
                _ => {}
            }
        }
    }

    let mut rows_stored = 0;
    for metrics in per_day.values() {
        state.db.ga4.upsert_metrics(metrics).await?;
        rows_stored += 1;
    }

    Ok(SyncSummary {
        rows_fetched,
        rows_stored,
    })
}

/// Sync per-page view metrics; the exit rate is derived from exits/views.
pub async fn sync_ga4_page_views(
    state: &AppState,
    user_id: Uuid,
    property_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SyncSummary, ApiError> {
    let access_token = access_token_for(state, user_id).await?;

    let report = state
        .ga4
        .run_report(
            &access_token,
            property_id,
            &Ga4ReportRequest::new(
                &start.format("%Y-%m-%d").to_string(),
                &end.format("%Y-%m-%d").to_string(),
                &["date", "pagePath", "pageTitle"],
                &[
                    "screenPageViews",
                    "sessions",
                    "averageSessionDuration",
                    "entrances",
                    "exits",
                ],
            ),
        )
        .await?;

    let rows_fetched = report.rows.len();
    let mut rows_stored = 0;

    for row in &report.rows {
        let Some(date) = parse_report_date(row.dimension(0)) else {
            continue;
        };
        let views = row.metric_i64(0);
        let exits = row.metric_i64(4);
        let exit_rate = if views > 0 {
            exits as f64 / views as f64 * 100.0
        } else {
            0.0
        };

        let page_view = Ga4PageViewRow {
            property_id: property_id.to_string(),
            date,
            page_path: row.dimension(1).to_string(),
            page_title: Some(row.dimension(2).to_string()),
            views,
            unique_views: row.metric_i64(1),
            avg_time_on_page: row.metric_f64(2),
            entrances: row.metric_i64(3),
            exits,
            exit_rate,
        };
        state.db.ga4.upsert_page_view(&page_view).await?;
        rows_stored += 1;
    }

    Ok(SyncSummary {
        rows_fetched,
        rows_stored,
    })
}

/// Sync per-event metrics.
pub async fn sync_ga4_events(
    state: &AppState,
    user_id: Uuid,
    property_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SyncSummary, ApiError> {
    let access_token = access_token_for(state, user_id).await?;

    let report = state
        .ga4
        .run_report(
            &access_token,
            property_id,
            &Ga4ReportRequest::new(
                &start.format("%Y-%m-%d").to_string(),
                &end.format("%Y-%m-%d").to_string(),
                &["date", "eventName"],
                &["eventCount", "activeUsers", "eventValue", "conversions"],
            ),
        )
        .await?;

    let rows_fetched = report.rows.len();
    let mut rows_stored = 0;

    for row in &report.rows {
        let Some(date) = parse_report_date(row.dimension(0)) else {
            continue;
        };
        let event = Ga4EventRow {
            property_id: property_id.to_string(),
            date,
            event_name: row.dimension(1).to_string(),
            event_count: row.metric_i64(0),
            unique_users: row.metric_i64(1),
            event_value: row.metric_f64(2),
            conversion_count: row.metric_i64(3),
        };
        state.db.ga4.upsert_event(&event).await?;
        rows_stored += 1;
    }

    Ok(SyncSummary {
        rows_fetched,
        rows_stored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_date() {
        assert_eq!(
            parse_report_date("20260715"),
            NaiveDate::from_ymd_opt(2026, 7, 15)
        );
        assert_eq!(parse_report_date("2026-07-15"), None);
        assert_eq!(parse_report_date(""), None);
    }
}
