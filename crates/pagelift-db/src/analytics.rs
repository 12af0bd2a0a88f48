//! Cross-table analytics queries backing the dashboard endpoints.
//!
//! These rollups read across `leads`, `landing_pages`, `seo_keywords`, and
//! the GA4 snapshot tables; the SQL engine does the aggregation and the
//! handlers only assemble the response shape.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{
    DailyCount, Error, LeadFunnel, LeadStatus, LeadStatusCount, Result, SeoTopPage,
    TopLandingPage, TrafficTrendPoint,
};

use crate::escape_like;

/// Aggregates shared by the lead, SEO, and integrated dashboards.
pub struct PgAnalyticsRepository {
    pool: Pool<Postgres>,
}

/// SEO + GA4 + lead rollup for one landing page.
#[derive(Debug, Clone, Default)]
pub struct PageViewAggregates {
    pub total_views: i64,
    pub total_unique_views: i64,
    pub avg_time_on_page: f64,
    pub total_entrances: i64,
    pub total_exits: i64,
    pub avg_exit_rate: f64,
}

impl PgAnalyticsRepository {
    /// Create a new PgAnalyticsRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // LEAD DASHBOARD
    // =========================================================================

    /// Total lead count, optionally restricted to a creation window.
    pub async fn lead_count(&self, since: Option<DateTime<Utc>>) -> Result<i64> {
        let row = match since {
            Some(since) => {
                sqlx::query("SELECT COUNT(*) AS total FROM leads WHERE created_at >= $1")
                    .bind(since)
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS total FROM leads")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(Error::Database)?;
        Ok(row.get("total"))
    }

    /// Leads currently in a converted state (`converted` or `closed_won`).
    pub async fn converted_lead_count(&self) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM leads WHERE status IN ('converted', 'closed_won')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("total"))
    }

    /// Leads with an assignee.
    pub async fn assigned_lead_count(&self) -> Result<i64> {
        let row =
            sqlx::query("SELECT COUNT(*) AS total FROM leads WHERE assigned_to IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(row.get("total"))
    }

    /// Lead counts per status, largest bucket first.
    pub async fn status_breakdown(&self) -> Result<Vec<LeadStatusCount>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM leads GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                let raw: String = r.get("status");
                let status = LeadStatus::parse(&raw)
                    .ok_or_else(|| Error::Internal(format!("unknown lead status '{}'", raw)))?;
                Ok(LeadStatusCount {
                    status,
                    count: r.get("count"),
                })
            })
            .collect()
    }

    /// Leads captured per day over the last `days` days.
    pub async fn leads_over_time(&self, days: i32) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query(
            "SELECT created_at::DATE AS date, COUNT(*) AS count \
             FROM leads \
             WHERE created_at >= NOW() - make_interval(days => $1) \
             GROUP BY created_at::DATE \
             ORDER BY date ASC",
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| DailyCount {
                date: r.get("date"),
                count: r.get("count"),
            })
            .collect())
    }

    /// Landing pages ranked by captured leads (pages without leads omitted).
    pub async fn top_landing_pages(&self, limit: i64) -> Result<Vec<TopLandingPage>> {
        let rows = sqlx::query(
            "SELECT lp.id, lp.title, lp.slug, COUNT(l.id) AS lead_count \
             FROM landing_pages lp \
             LEFT JOIN leads l ON l.landing_page_id = lp.id \
             GROUP BY lp.id, lp.title, lp.slug \
             HAVING COUNT(l.id) > 0 \
             ORDER BY lead_count DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| TopLandingPage {
                id: r.get("id"),
                title: r.get("title"),
                slug: r.get("slug"),
                lead_count: r.get("lead_count"),
            })
            .collect())
    }

    // =========================================================================
    // LEAD FUNNELS
    // =========================================================================

    /// Status funnel for all leads captured since a timestamp, optionally
    /// scoped to one landing page.
    pub async fn lead_funnel(
        &self,
        since: DateTime<Utc>,
        landing_page_id: Option<Uuid>,
    ) -> Result<LeadFunnel> {
        let mut sql = String::from(
            "SELECT \
               COUNT(*) AS total_leads, \
               COUNT(*) FILTER (WHERE status = 'new') AS new_leads, \
               COUNT(*) FILTER (WHERE status = 'contacted') AS contacted_leads, \
               COUNT(*) FILTER (WHERE status = 'qualified') AS qualified_leads, \
               COUNT(*) FILTER (WHERE status IN ('converted', 'closed_won')) AS converted_leads \
             FROM leads WHERE created_at >= $1",
        );
        if landing_page_id.is_some() {
            sql.push_str(" AND landing_page_id = $2");
        }

        let mut query = sqlx::query(&sql).bind(since);
        if let Some(id) = landing_page_id {
            query = query.bind(id);
        }

        let row = query.fetch_one(&self.pool).await.map_err(Error::Database)?;

        Ok(LeadFunnel {
            total_leads: row.get("total_leads"),
            new_leads: row.get("new_leads"),
            contacted_leads: row.get("contacted_leads"),
            qualified_leads: row.get("qualified_leads"),
            converted_leads: row.get("converted_leads"),
        })
    }

    // =========================================================================
    // TRAFFIC ROLLUPS (GA4 SNAPSHOTS)
    // =========================================================================

    /// Daily page-view trend across all properties for the range.
    pub async fn traffic_trend(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrafficTrendPoint>> {
        let rows = sqlx::query(
            "SELECT date, \
               SUM(views)::BIGINT AS daily_views, \
               SUM(unique_views)::BIGINT AS daily_unique_views, \
               COALESCE(AVG(avg_time_on_page), 0)::FLOAT8 AS daily_avg_time \
             FROM ga4_page_views \
             WHERE date BETWEEN $1 AND $2 \
             GROUP BY date \
             ORDER BY date ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| TrafficTrendPoint {
                date: r.get("date"),
                page_views: r.get("daily_views"),
                unique_views: r.get("daily_unique_views"),
                avg_time: r.get("daily_avg_time"),
            })
            .collect())
    }

    /// Session totals from the daily metrics snapshots for the range.
    pub async fn session_totals(&self, start: NaiveDate, end: NaiveDate) -> Result<(i64, f64)> {
        let row = sqlx::query(
            "SELECT \
               COALESCE(SUM(sessions), 0)::BIGINT AS total_sessions, \
               COALESCE(AVG(avg_session_duration), 0)::FLOAT8 AS avg_duration \
             FROM ga4_metrics \
             WHERE date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((row.get("total_sessions"), row.get("avg_duration")))
    }

    /// Pages ranked by views for the unified dashboard.
    pub async fn seo_top_pages(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<SeoTopPage>> {
        let rows = sqlx::query(
            "SELECT page_path, page_title, \
               SUM(views)::BIGINT AS total_views, \
               SUM(unique_views)::BIGINT AS total_unique_views, \
               COALESCE(AVG(avg_time_on_page), 0)::FLOAT8 AS avg_time, \
               COALESCE(AVG(exit_rate), 0)::FLOAT8 AS avg_exit_rate \
             FROM ga4_page_views \
             WHERE date BETWEEN $1 AND $2 \
             GROUP BY page_path, page_title \
             ORDER BY total_views DESC \
             LIMIT $3",
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| SeoTopPage {
                page_path: r.get("page_path"),
                page_title: r.get("page_title"),
                views: r.get("total_views"),
                unique_views: r.get("total_unique_views"),
                avg_time: r.get("avg_time"),
                exit_rate: r.get("avg_exit_rate"),
            })
            .collect())
    }

    // =========================================================================
    // PER-PAGE INTEGRATION
    // =========================================================================

    /// Page-view aggregates for paths containing the page slug.
    pub async fn page_view_aggregates_for_slug(
        &self,
        slug: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PageViewAggregates> {
        let row = sqlx::query(
            "SELECT \
               COALESCE(SUM(views), 0)::BIGINT AS total_views, \
               COALESCE(SUM(unique_views), 0)::BIGINT AS total_unique_views, \
               COALESCE(AVG(avg_time_on_page), 0)::FLOAT8 AS avg_time_on_page, \
               COALESCE(SUM(entrances), 0)::BIGINT AS total_entrances, \
               COALESCE(SUM(exits), 0)::BIGINT AS total_exits, \
               COALESCE(AVG(exit_rate), 0)::FLOAT8 AS avg_exit_rate \
             FROM ga4_page_views \
             WHERE page_path LIKE $1 AND date BETWEEN $2 AND $3",
        )
        .bind(format!("%{}%", escape_like(slug)))
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(PageViewAggregates {
            total_views: row.get("total_views"),
            total_unique_views: row.get("total_unique_views"),
            avg_time_on_page: row.get("avg_time_on_page"),
            total_entrances: row.get("total_entrances"),
            total_exits: row.get("total_exits"),
            avg_exit_rate: row.get("avg_exit_rate"),
        })
    }

    /// Keyword aggregates for URLs containing the page slug, ordered by
    /// clicks.
    pub async fn keywords_for_slug(
        &self,
        slug: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<pagelift_core::KeywordPerformance>> {
        let rows = sqlx::query(
            "SELECT keyword, url, \
               SUM(impressions)::BIGINT AS total_impressions, \
               SUM(clicks)::BIGINT AS total_clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS avg_ctr, \
               AVG(position)::FLOAT8 AS avg_position, \
               MIN(date) AS first_seen, \
               MAX(date) AS last_seen, \
               COUNT(DISTINCT date)::BIGINT AS data_points \
             FROM seo_keywords \
             WHERE url LIKE $1 AND date BETWEEN $2 AND $3 \
             GROUP BY keyword, url \
             ORDER BY total_clicks DESC \
             LIMIT $4",
        )
        .bind(format!("%{}%", escape_like(slug)))
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| pagelift_core::KeywordPerformance {
                keyword: r.get("keyword"),
                url: r.get("url"),
                total_impressions: r.get("total_impressions"),
                total_clicks: r.get("total_clicks"),
                avg_ctr: r.get("avg_ctr"),
                avg_position: r.get("avg_position"),
                first_seen: r.get("first_seen"),
                last_seen: r.get("last_seen"),
                data_points: r.get("data_points"),
            })
            .collect())
    }

    /// SEO clicks attributed to a slug within the range.
    pub async fn seo_clicks_for_slug(
        &self,
        slug: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(clicks), 0)::BIGINT AS total_clicks \
             FROM seo_keywords \
             WHERE url LIKE $1 AND date BETWEEN $2 AND $3",
        )
        .bind(format!("%{}%", escape_like(slug)))
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("total_clicks"))
    }
}
