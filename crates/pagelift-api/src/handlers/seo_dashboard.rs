//! Unified SEO dashboard: keywords, traffic, and lead funnel in one
//! response.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

use pagelift_core::KeywordRankingTrendPoint;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{lookback_days, range_from_days};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeoDashboardQuery {
    pub days: Option<i64>,
}

/// Unified snapshot across Search Console, GA4, and lead data.
///
/// `GET /api/admin/seo-dashboard`
pub async fn seo_dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SeoDashboardQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let (start, end) = range_from_days(days);
    let since: DateTime<Utc> = DateTime::from_naive_utc_and_offset(
        start.and_hms_opt(0, 0, 0).unwrap_or_default(),
        Utc,
    );

    let analytics = &state.db.analytics;
    let seo = &state.db.seo;

    let keyword_metrics = seo.keyword_metrics(start, end).await?;
    let traffic_trend = analytics.traffic_trend(start, end).await?;
    let (total_sessions, avg_session_duration) = analytics.session_totals(start, end).await?;
    let top_keywords = seo.top_keywords_in_range(start, end, 10).await?;
    let top_pages = analytics.seo_top_pages(start, end, 10).await?;
    let lead_funnel = analytics.lead_funnel(since, None).await?;

    // Ranking trend series for the five keywords with the most clicks.
    let trend_keywords: Vec<String> = top_keywords
        .iter()
        .take(5)
        .map(|k| k.keyword.clone())
        .collect();
    let positions = seo.daily_positions(&trend_keywords, start, end).await?;

    let mut by_date: BTreeMap<chrono::NaiveDate, KeywordRankingTrendPoint> = BTreeMap::new();
    for (keyword, date, avg_position) in positions {
        by_date
            .entry(date)
            .or_insert_with(|| KeywordRankingTrendPoint {
                date,
                positions: Default::default(),
            })
            .positions
            .insert(keyword, (avg_position * 10.0).round() / 10.0);
    }
    let keyword_trends: Vec<KeywordRankingTrendPoint> = by_date.into_values().collect();

    let total_page_views: i64 = traffic_trend.iter().map(|p| p.page_views).sum();
    let conversion_rate = if total_page_views > 0 {
        (lead_funnel.total_leads as f64 / total_page_views as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "dateRange": {
                "startDate": start,
                "endDate": end,
                "days": days,
            },
            "quickStats": {
                "totalKeywords": keyword_metrics.total_keywords,
                "avgPosition": keyword_metrics.avg_position,
                "totalImpressions": keyword_metrics.total_impressions,
                "totalClicks": keyword_metrics.total_clicks,
                "avgCTR": keyword_metrics.avg_ctr,
                "totalPageViews": total_page_views,
                "totalSessions": total_sessions,
                "avgSessionDuration": avg_session_duration,
                "totalLeads": lead_funnel.total_leads,
                "conversionRate": conversion_rate,
            },
            "keywordMetrics": keyword_metrics,
            "trafficTrends": traffic_trend,
            "topKeywords": top_keywords,
            "topPages": top_pages,
            "leadMetrics": lead_funnel,
            "keywordTrends": keyword_trends,
        }
    })))
}
