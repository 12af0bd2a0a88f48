//! Integrated analytics: landing page + SEO + GA4 + lead data combined.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use pagelift_core::{LandingPageRepository, PublishStatus};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{lookback_days, range_from_days};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

fn since_utc(start: chrono::NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(start.and_hms_opt(0, 0, 0).unwrap_or_default(), Utc)
}

/// Performance overview for all published landing pages.
///
/// `GET /api/admin/integrated-analytics/landing-pages`
pub async fn all_pages_performance(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DaysQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let (start, end) = range_from_days(days);
    let since = since_utc(start);

    let pages = state
        .db
        .landing_pages
        .list(pagelift_core::ListLandingPagesRequest {
            publish_status: Some(PublishStatus::Published),
            limit: Some(pagelift_core::defaults::EXPORT_FETCH_LIMIT),
            ..Default::default()
        })
        .await?;

    let mut rows = Vec::with_capacity(pages.len());
    for page in &pages {
        let seo_clicks = state
            .db
            .analytics
            .seo_clicks_for_slug(&page.slug, start, end)
            .await?;
        let views = state
            .db
            .analytics
            .page_view_aggregates_for_slug(&page.slug, start, end)
            .await?
            .total_views;
        let funnel = state
            .db
            .analytics
            .lead_funnel(since, Some(page.id))
            .await?;

        let conversion_rate = if views > 0 {
            (funnel.total_leads as f64 / views as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        rows.push(serde_json::json!({
            "id": page.id,
            "title": page.title,
            "slug": page.slug,
            "url": format!("/public/{}", page.slug),
            "status": page.publish_status,
            "publishedAt": page.published_at,
            "seoClicks": seo_clicks,
            "analyticsViews": views,
            "leads": funnel.total_leads,
            "conversionRate": conversion_rate,
        }));
    }

    let count = rows.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "landingPages": rows,
            "count": count,
            "days": days,
        }
    })))
}

/// Detailed performance for one landing page.
///
/// `GET /api/admin/integrated-analytics/landing-pages/:id`
pub async fn page_performance(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = lookback_days(query.days);
    let (start, end) = range_from_days(days);
    let since = since_utc(start);

    let page = state
        .db
        .landing_pages
        .get(id)
        .await?
        .ok_or(pagelift_core::Error::PageNotFound(id))?;

    let keywords = state
        .db
        .analytics
        .keywords_for_slug(&page.slug, start, end, 10)
        .await?;
    let views = state
        .db
        .analytics
        .page_view_aggregates_for_slug(&page.slug, start, end)
        .await?;
    let top_events = state.db.ga4.top_events_all(start, end, 5).await?;
    let funnel = state.db.analytics.lead_funnel(since, Some(id)).await?;

    let total_clicks: i64 = keywords.iter().map(|k| k.total_clicks).sum();
    let total_impressions: i64 = keywords.iter().map(|k| k.total_impressions).sum();
    let avg_position = if keywords.is_empty() {
        0.0
    } else {
        keywords
            .iter()
            .filter_map(|k| k.avg_position)
            .sum::<f64>()
            / keywords.len() as f64
    };

    let conversion_rate = if views.total_views > 0 {
        (funnel.total_leads as f64 / views.total_views as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };
    let clicks_to_leads = if total_clicks > 0 {
        (funnel.total_leads as f64 / total_clicks as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "landingPage": {
                "id": page.id,
                "title": page.title,
                "slug": page.slug,
                "url": format!("/public/{}", page.slug),
                "status": page.publish_status,
                "publishedUrl": page.published_url,
                "createdAt": page.created_at,
                "publishedAt": page.published_at,
            },
            "dateRange": {
                "startDate": start,
                "endDate": end,
                "days": days,
            },
            "seo": {
                "topKeywords": keywords,
                "totalClicks": total_clicks,
                "totalImpressions": total_impressions,
                "avgPosition": avg_position,
            },
            "analytics": {
                "totalViews": views.total_views,
                "uniqueViews": views.total_unique_views,
                "avgTimeOnPage": views.avg_time_on_page,
                "totalEntrances": views.total_entrances,
                "totalExits": views.total_exits,
                "exitRate": views.avg_exit_rate,
                "topEvents": top_events,
            },
            "leads": {
                "total": funnel.total_leads,
                "new": funnel.new_leads,
                "contacted": funnel.contacted_leads,
                "qualified": funnel.qualified_leads,
                "converted": funnel.converted_leads,
            },
            "performance": {
                "conversionRate": conversion_rate,
                "clicksToLeads": clicks_to_leads,
            },
        }
    })))
}
