//! GA4 snapshot repository implementation.
//!
//! Mirrors Google Analytics 4 report rows into local tables keyed on
//! (property, date[, dimension]). Syncs upsert; a re-run over the same range
//! overwrites the affected cells rather than duplicating them.

use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{
    new_v7, AddGa4PropertyRequest, Error, Ga4DailyMetrics, Ga4EventRow, Ga4PageViewRow,
    Ga4Property, Ga4SummaryTotals, Ga4TopEvent, Ga4TopPage, Result,
};

/// PostgreSQL repository for GA4 properties and mirrored report data.
pub struct PgGa4Repository {
    pool: Pool<Postgres>,
}

fn property_from_row(row: &PgRow) -> Ga4Property {
    Ga4Property {
        id: row.get("id"),
        user_id: row.get("user_id"),
        property_id: row.get("property_id"),
        property_name: row.get("property_name"),
        website_url: row.get("website_url"),
        timezone: row.get("timezone"),
        currency_code: row.get("currency_code"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgGa4Repository {
    /// Create a new PgGa4Repository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Active properties registered by a user, newest first.
    pub async fn list_properties(&self, user_id: Uuid) -> Result<Vec<Ga4Property>> {
        let rows = sqlx::query(
            "SELECT id, user_id, property_id, property_name, website_url, timezone, \
             currency_code, is_active, created_at, updated_at \
             FROM ga4_properties \
             WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(property_from_row).collect())
    }

    /// Register a property, reactivating and refreshing it when it already
    /// exists for this user.
    pub async fn upsert_property(
        &self,
        user_id: Uuid,
        req: &AddGa4PropertyRequest,
    ) -> Result<Ga4Property> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO ga4_properties
                (id, user_id, property_id, property_name, website_url, timezone,
                 currency_code, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
            ON CONFLICT (user_id, property_id)
            DO UPDATE SET
                property_name = EXCLUDED.property_name,
                website_url = EXCLUDED.website_url,
                timezone = EXCLUDED.timezone,
                currency_code = EXCLUDED.currency_code,
                is_active = TRUE,
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, property_id, property_name, website_url, timezone,
                      currency_code, is_active, created_at, updated_at
            "#,
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(&req.property_id)
        .bind(&req.property_name)
        .bind(&req.website_url)
        .bind(&req.timezone)
        .bind(&req.currency_code)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(property_from_row(&row))
    }

    // =========================================================================
    // DAILY METRICS
    // =========================================================================

    /// Upsert one day of site metrics.
    pub async fn upsert_metrics(&self, m: &Ga4DailyMetrics) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ga4_metrics
                (property_id, date, users, new_users, sessions, engaged_sessions,
                 engagement_rate, avg_session_duration, pages_per_session, bounce_rate,
                 conversions, total_revenue, desktop_users, mobile_users, tablet_users)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (property_id, date)
            DO UPDATE SET
                users = EXCLUDED.users,
                new_users = EXCLUDED.new_users,
                sessions = EXCLUDED.sessions,
                engaged_sessions = EXCLUDED.engaged_sessions,
                engagement_rate = EXCLUDED.engagement_rate,
                avg_session_duration = EXCLUDED.avg_session_duration,
                pages_per_session = EXCLUDED.pages_per_session,
                bounce_rate = EXCLUDED.bounce_rate,
                conversions = EXCLUDED.conversions,
                total_revenue = EXCLUDED.total_revenue,
                desktop_users = EXCLUDED.desktop_users,
                mobile_users = EXCLUDED.mobile_users,
                tablet_users = EXCLUDED.tablet_users
            "#,
        )
        .bind(&m.property_id)
        .bind(m.date)
        .bind(m.users)
        .bind(m.new_users)
        .bind(m.sessions)
        .bind(m.engaged_sessions)
        .bind(m.engagement_rate)
        .bind(m.avg_session_duration)
        .bind(m.pages_per_session)
        .bind(m.bounce_rate)
        .bind(m.conversions)
        .bind(m.total_revenue)
        .bind(m.desktop_users)
        .bind(m.mobile_users)
        .bind(m.tablet_users)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Mirrored site metrics for a date range, newest first.
    pub async fn get_metrics(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Ga4DailyMetrics>> {
        let rows = sqlx::query(
            "SELECT property_id, date, users, new_users, sessions, engaged_sessions, \
             engagement_rate, avg_session_duration, pages_per_session, bounce_rate, \
             conversions, total_revenue, desktop_users, mobile_users, tablet_users \
             FROM ga4_metrics \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date DESC",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Ga4DailyMetrics {
                property_id: r.get("property_id"),
                date: r.get("date"),
                users: r.get("users"),
                new_users: r.get("new_users"),
                sessions: r.get("sessions"),
                engaged_sessions: r.get("engaged_sessions"),
                engagement_rate: r.get("engagement_rate"),
                avg_session_duration: r.get("avg_session_duration"),
                pages_per_session: r.get("pages_per_session"),
                bounce_rate: r.get("bounce_rate"),
                conversions: r.get("conversions"),
                total_revenue: r.get("total_revenue"),
                desktop_users: r.get("desktop_users"),
                mobile_users: r.get("mobile_users"),
                tablet_users: r.get("tablet_users"),
            })
            .collect())
    }

    // =========================================================================
    // PAGE VIEWS
    // =========================================================================

    /// Upsert one (date, page) page-view row.
    pub async fn upsert_page_view(&self, pv: &Ga4PageViewRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ga4_page_views
                (property_id, date, page_path, page_title, views, unique_views,
                 avg_time_on_page, entrances, exits, exit_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (property_id, date, page_path)
            DO UPDATE SET
                page_title = EXCLUDED.page_title,
                views = EXCLUDED.views,
                unique_views = EXCLUDED.unique_views,
                avg_time_on_page = EXCLUDED.avg_time_on_page,
                entrances = EXCLUDED.entrances,
                exits = EXCLUDED.exits,
                exit_rate = EXCLUDED.exit_rate
            "#,
        )
        .bind(&pv.property_id)
        .bind(pv.date)
        .bind(&pv.page_path)
        .bind(&pv.page_title)
        .bind(pv.views)
        .bind(pv.unique_views)
        .bind(pv.avg_time_on_page)
        .bind(pv.entrances)
        .bind(pv.exits)
        .bind(pv.exit_rate)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Mirrored page views for a date range, most viewed first.
    pub async fn get_page_views(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Ga4PageViewRow>> {
        let rows = sqlx::query(
            "SELECT property_id, date, page_path, page_title, views, unique_views, \
             avg_time_on_page, entrances, exits, exit_rate \
             FROM ga4_page_views \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY views DESC \
             LIMIT $4",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Ga4PageViewRow {
                property_id: r.get("property_id"),
                date: r.get("date"),
                page_path: r.get("page_path"),
                page_title: r.get("page_title"),
                views: r.get("views"),
                unique_views: r.get("unique_views"),
                avg_time_on_page: r.get("avg_time_on_page"),
                entrances: r.get("entrances"),
                exits: r.get("exits"),
                exit_rate: r.get("exit_rate"),
            })
            .collect())
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Upsert one (date, event) row.
    pub async fn upsert_event(&self, ev: &Ga4EventRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ga4_events
                (property_id, date, event_name, event_count, unique_users,
                 event_value, conversion_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (property_id, date, event_name)
            DO UPDATE SET
                event_count = EXCLUDED.event_count,
                unique_users = EXCLUDED.unique_users,
                event_value = EXCLUDED.event_value,
                conversion_count = EXCLUDED.conversion_count
            "#,
        )
        .bind(&ev.property_id)
        .bind(ev.date)
        .bind(&ev.event_name)
        .bind(ev.event_count)
        .bind(ev.unique_users)
        .bind(ev.event_value)
        .bind(ev.conversion_count)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Mirrored events for a date range, most frequent first.
    pub async fn get_events(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Ga4EventRow>> {
        let rows = sqlx::query(
            "SELECT property_id, date, event_name, event_count, unique_users, \
             event_value, conversion_count \
             FROM ga4_events \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY event_count DESC \
             LIMIT $4",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Ga4EventRow {
                property_id: r.get("property_id"),
                date: r.get("date"),
                event_name: r.get("event_name"),
                event_count: r.get("event_count"),
                unique_users: r.get("unique_users"),
                event_value: r.get("event_value"),
                conversion_count: r.get("conversion_count"),
            })
            .collect())
    }

    // =========================================================================
    // DASHBOARD ROLLUPS
    // =========================================================================

    /// Aggregated totals across the range for the dashboard summary.
    pub async fn summary_totals(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Ga4SummaryTotals> {
        let row = sqlx::query(
            "SELECT \
               COALESCE(SUM(users), 0)::BIGINT AS total_users, \
               COALESCE(SUM(new_users), 0)::BIGINT AS total_new_users, \
               COALESCE(SUM(sessions), 0)::BIGINT AS total_sessions, \
               COALESCE(AVG(engagement_rate), 0)::FLOAT8 AS avg_engagement_rate, \
               COALESCE(AVG(avg_session_duration), 0)::FLOAT8 AS avg_session_duration, \
               COALESCE(SUM(conversions), 0)::BIGINT AS total_conversions, \
               COALESCE(SUM(total_revenue), 0)::FLOAT8 AS total_revenue, \
               COALESCE(SUM(desktop_users), 0)::BIGINT AS desktop_users, \
               COALESCE(SUM(mobile_users), 0)::BIGINT AS mobile_users, \
               COALESCE(SUM(tablet_users), 0)::BIGINT AS tablet_users \
             FROM ga4_metrics \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Ga4SummaryTotals {
            total_users: row.get("total_users"),
            total_new_users: row.get("total_new_users"),
            total_sessions: row.get("total_sessions"),
            avg_engagement_rate: row.get("avg_engagement_rate"),
            avg_session_duration: row.get("avg_session_duration"),
            total_conversions: row.get("total_conversions"),
            total_revenue: row.get("total_revenue"),
            desktop_users: row.get("desktop_users"),
            mobile_users: row.get("mobile_users"),
            tablet_users: row.get("tablet_users"),
        })
    }

    /// Pages ranked by total views across the range.
    pub async fn top_pages(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Ga4TopPage>> {
        let rows = sqlx::query(
            "SELECT page_path, page_title, SUM(views)::BIGINT AS total_views \
             FROM ga4_page_views \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3 \
             GROUP BY page_path, page_title \
             ORDER BY total_views DESC \
             LIMIT $4",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Ga4TopPage {
                page_path: r.get("page_path"),
                page_title: r.get("page_title"),
                total_views: r.get("total_views"),
            })
            .collect())
    }

    /// Events ranked by total count across the range, all properties
    /// combined. Events carry no page dimension, so the integrated view
    /// uses the property-wide totals as a proxy.
    pub async fn top_events_all(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Ga4TopEvent>> {
        let rows = sqlx::query(
            "SELECT event_name, SUM(event_count)::BIGINT AS total_count \
             FROM ga4_events \
             WHERE date BETWEEN $1 AND $2 \
             GROUP BY event_name \
             ORDER BY total_count DESC \
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
            .map(|r| Ga4TopEvent {
                event_name: r.get("event_name"),
                total_count: r.get("total_count"),
            })
            .collect())
    }

    /// Events ranked by total count across the range.
    pub async fn top_events(
        &self,
        property_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Ga4TopEvent>> {
        let rows = sqlx::query(
            "SELECT event_name, SUM(event_count)::BIGINT AS total_count \
             FROM ga4_events \
             WHERE property_id = $1 AND date BETWEEN $2 AND $3 \
             GROUP BY event_name \
             ORDER BY total_count DESC \
             LIMIT $4",
        )
        .bind(property_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Ga4TopEvent {
                event_name: r.get("event_name"),
                total_count: r.get("total_count"),
            })
            .collect())
    }
}
