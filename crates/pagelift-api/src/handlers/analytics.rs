//! Lead analytics dashboard.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};

use pagelift_core::{LeadDashboard, LeadDashboardTotals};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Headline lead metrics, funnel breakdown, capture trend, and top pages.
///
/// `GET /api/admin/analytics/dashboard`
pub async fn lead_dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let analytics = &state.db.analytics;
    let now = Utc::now();

    let total_leads = analytics.lead_count(None).await?;
    let new_leads = analytics.lead_count(Some(now - Duration::days(7))).await?;
    let converted_leads = analytics.converted_lead_count().await?;
    let assigned_leads = analytics.assigned_lead_count().await?;

    let conversion_rate = if total_leads > 0 {
        (converted_leads as f64 / total_leads as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    let dashboard = LeadDashboard {
        totals: LeadDashboardTotals {
            total_leads,
            new_leads,
            converted_leads,
            conversion_rate,
            assigned_leads,
            unassigned_leads: total_leads - assigned_leads,
        },
        status_breakdown: analytics.status_breakdown().await?,
        leads_over_time: analytics.leads_over_time(30).await?,
        top_landing_pages: analytics.top_landing_pages(5).await?,
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "data": dashboard,
    })))
}
