//! SEO keyword and indexing-issue repository implementation.
//!
//! `seo_keywords` holds one row per (keyword, url, date, country, device)
//! cell mirrored from Search Console; reads aggregate over date ranges.

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use pagelift_core::{
    new_v7, DecliningKeyword, Error, IndexingIssue, IndexingIssueUpsert, KeywordFilter,
    KeywordPerformance, KeywordSortBy, KeywordTrendPoint, Result, SeoKeywordUpsert, TopKeyword,
};

use crate::escape_like;

/// PostgreSQL repository for mirrored Search Console data.
pub struct PgSeoRepository {
    pool: Pool<Postgres>,
}

impl PgSeoRepository {
    /// Create a new PgSeoRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Upsert one keyword sample. The natural key treats NULL url/country/
    /// device as distinct cells, so those columns are coalesced to '' in the
    /// unique index.
    pub async fn upsert_keyword(&self, row: &SeoKeywordUpsert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO seo_keywords
                (id, keyword, url, impressions, clicks, ctr, position, date, country, device, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (keyword, COALESCE(url, ''), date, COALESCE(country, ''), COALESCE(device, ''))
            DO UPDATE SET
                impressions = EXCLUDED.impressions,
                clicks = EXCLUDED.clicks,
                ctr = EXCLUDED.ctr,
                position = EXCLUDED.position
            "#,
        )
        .bind(new_v7())
        .bind(&row.keyword)
        .bind(&row.url)
        .bind(row.impressions)
        .bind(row.clicks)
        .bind(row.ctr)
        .bind(row.position)
        .bind(row.date)
        .bind(&row.country)
        .bind(&row.device)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Per-(keyword, url) aggregates over a filtered range, ordered by
    /// impressions.
    pub async fn keyword_performance(
        &self,
        filter: &KeywordFilter,
    ) -> Result<Vec<KeywordPerformance>> {
        let mut sql = String::from(
            "SELECT keyword, url, \
               SUM(impressions)::BIGINT AS total_impressions, \
               SUM(clicks)::BIGINT AS total_clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS avg_ctr, \
               AVG(position)::FLOAT8 AS avg_position, \
               MIN(date) AS first_seen, \
               MAX(date) AS last_seen, \
               COUNT(*)::BIGINT AS data_points \
             FROM seo_keywords WHERE 1=1",
        );
        let mut param = 0;

        if filter.start_date.is_some() {
            param += 1;
            sql.push_str(&format!(" AND date >= ${param}"));
        }
        if filter.end_date.is_some() {
            param += 1;
            sql.push_str(&format!(" AND date <= ${param}"));
        }
        if filter.keyword.is_some() {
            param += 1;
            sql.push_str(&format!(" AND keyword ILIKE ${param}"));
        }
        if filter.url.is_some() {
            param += 1;
            sql.push_str(&format!(" AND url ILIKE ${param}"));
        }

        sql.push_str(&format!(
            " GROUP BY keyword, url ORDER BY total_impressions DESC LIMIT ${} OFFSET ${}",
            param + 1,
            param + 2
        ));

        let mut query = sqlx::query(&sql);
        if let Some(start) = filter.start_date {
            query = query.bind(start);
        }
        if let Some(end) = filter.end_date {
            query = query.bind(end);
        }
        if let Some(keyword) = &filter.keyword {
            query = query.bind(format!("%{}%", escape_like(keyword)));
        }
        if let Some(url) = &filter.url {
            query = query.bind(format!("%{}%", escape_like(url)));
        }

        let rows = query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| KeywordPerformance {
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

    /// Daily ranking trend for one keyword over the last `days` days.
    pub async fn keyword_trend(&self, keyword: &str, days: i32) -> Result<Vec<KeywordTrendPoint>> {
        let rows = sqlx::query(
            "SELECT date, \
               AVG(position)::FLOAT8 AS avg_position, \
               SUM(impressions)::BIGINT AS impressions, \
               SUM(clicks)::BIGINT AS clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS ctr \
             FROM seo_keywords \
             WHERE keyword = $1 AND date >= CURRENT_DATE - $2 \
             GROUP BY date \
             ORDER BY date ASC",
        )
        .bind(keyword)
        .bind(days)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| KeywordTrendPoint {
                date: r.get("date"),
                avg_position: r.get("avg_position"),
                impressions: r.get("impressions"),
                clicks: r.get("clicks"),
                ctr: r.get("ctr"),
            })
            .collect())
    }

    /// Keywords ranked by the requested metric over the last `days` days.
    pub async fn top_keywords(
        &self,
        limit: i64,
        sort_by: KeywordSortBy,
        days: i32,
    ) -> Result<Vec<TopKeyword>> {
        // sort column comes from the KeywordSortBy whitelist, never from input
        let sql = format!(
            "SELECT keyword, \
               SUM(impressions)::BIGINT AS total_impressions, \
               SUM(clicks)::BIGINT AS total_clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS avg_ctr, \
               AVG(position)::FLOAT8 AS avg_position \
             FROM seo_keywords \
             WHERE date >= CURRENT_DATE - $1 \
             GROUP BY keyword \
             ORDER BY {} DESC \
             LIMIT $2",
            sort_by.column()
        );

        let rows = sqlx::query(&sql)
            .bind(days)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| TopKeyword {
                keyword: r.get("keyword"),
                total_impressions: r.get("total_impressions"),
                total_clicks: r.get("total_clicks"),
                avg_ctr: r.get("avg_ctr"),
                avg_position: r.get("avg_position"),
            })
            .collect())
    }

    /// Keywords whose average position worsened between the older and recent
    /// halves of the lookback window. Position grows as rank declines, so a
    /// positive change means lost ground.
    pub async fn declining_keywords(&self, limit: i64, days: i32) -> Result<Vec<DecliningKeyword>> {
        let half = days / 2;
        let rows = sqlx::query(
            r#"
            WITH recent_data AS (
                SELECT keyword, AVG(position)::FLOAT8 AS recent_position
                FROM seo_keywords
                WHERE date >= CURRENT_DATE - $1 AND position IS NOT NULL
                GROUP BY keyword
            ),
            older_data AS (
                SELECT keyword, AVG(position)::FLOAT8 AS older_position
                FROM seo_keywords
                WHERE date >= CURRENT_DATE - $2
                  AND date < CURRENT_DATE - $1
                  AND position IS NOT NULL
                GROUP BY keyword
            )
            SELECT
                recent_data.keyword,
                recent_data.recent_position,
                older_data.older_position,
                (recent_data.recent_position - older_data.older_position) AS position_change
            FROM recent_data
            JOIN older_data ON recent_data.keyword = older_data.keyword
            WHERE (recent_data.recent_position - older_data.older_position) > 0
            ORDER BY position_change DESC
            LIMIT $3
            "#,
        )
        .bind(half)
        .bind(days)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| DecliningKeyword {
                keyword: r.get("keyword"),
                recent_position: r.get("recent_position"),
                older_position: r.get("older_position"),
                position_change: r.get("position_change"),
            })
            .collect())
    }

    // =========================================================================
    // INDEXING ISSUES
    // =========================================================================

    /// Upsert a detected issue. A row already marked resolved stays resolved
    /// even when the issue is re-detected.
    pub async fn upsert_indexing_issue(&self, issue: &IndexingIssueUpsert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO seo_indexing_issues
                (id, url, issue_type, severity, description, detected_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (url, issue_type, detected_date)
            DO UPDATE SET
                severity = EXCLUDED.severity,
                description = EXCLUDED.description,
                status = CASE
                    WHEN seo_indexing_issues.status = 'resolved' THEN 'resolved'
                    ELSE EXCLUDED.status
                END
            "#,
        )
        .bind(new_v7())
        .bind(&issue.url)
        .bind(&issue.issue_type)
        .bind(&issue.severity)
        .bind(&issue.description)
        .bind(issue.detected_date)
        .bind(&issue.status)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Stored issues filtered by status and severity, newest first.
    pub async fn list_indexing_issues(
        &self,
        status: Option<&str>,
        severity: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IndexingIssue>> {
        let mut sql = String::from(
            "SELECT id, url, issue_type, severity, description, detected_date, status, created_at \
             FROM seo_indexing_issues WHERE 1=1",
        );
        let mut param = 0;

        if status.is_some() {
            param += 1;
            sql.push_str(&format!(" AND status = ${param}"));
        }
        if severity.is_some() {
            param += 1;
            sql.push_str(&format!(" AND severity = ${param}"));
        }
        sql.push_str(&format!(
            " ORDER BY detected_date DESC, severity DESC LIMIT ${} OFFSET ${}",
            param + 1,
            param + 2
        ));

        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status.to_string());
        }
        if let Some(severity) = severity {
            query = query.bind(severity.to_string());
        }

        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(issue_from_row).collect())
    }

    // =========================================================================
    // DASHBOARD ROLLUPS
    // =========================================================================

    /// Whole-range keyword rollup for the unified dashboard.
    pub async fn keyword_metrics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<pagelift_core::KeywordMetrics> {
        let row = sqlx::query(
            "SELECT \
               COUNT(DISTINCT keyword)::BIGINT AS total_keywords, \
               COALESCE(SUM(impressions), 0)::BIGINT AS total_impressions, \
               COALESCE(SUM(clicks), 0)::BIGINT AS total_clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS avg_ctr, \
               COALESCE(AVG(position), 0)::FLOAT8 AS avg_position \
             FROM seo_keywords \
             WHERE date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(pagelift_core::KeywordMetrics {
            total_keywords: row.get("total_keywords"),
            total_impressions: row.get("total_impressions"),
            total_clicks: row.get("total_clicks"),
            avg_ctr: row.get("avg_ctr"),
            avg_position: row.get("avg_position"),
        })
    }

    /// Top keywords by clicks within an explicit date range (dashboard block).
    pub async fn top_keywords_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TopKeyword>> {
        let rows = sqlx::query(
            "SELECT keyword, \
               SUM(impressions)::BIGINT AS total_impressions, \
               SUM(clicks)::BIGINT AS total_clicks, \
               COALESCE(AVG(ctr), 0)::FLOAT8 AS avg_ctr, \
               AVG(position)::FLOAT8 AS avg_position \
             FROM seo_keywords \
             WHERE date BETWEEN $1 AND $2 \
             GROUP BY keyword \
             ORDER BY total_clicks DESC \
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
            .map(|r| TopKeyword {
                keyword: r.get("keyword"),
                total_impressions: r.get("total_impressions"),
                total_clicks: r.get("total_clicks"),
                avg_ctr: r.get("avg_ctr"),
                avg_position: r.get("avg_position"),
            })
            .collect())
    }

    /// Daily average positions for the given keywords (ranking trend chart).
    pub async fn daily_positions(
        &self,
        keywords: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, NaiveDate, f64)>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            "SELECT keyword, date, AVG(position)::FLOAT8 AS avg_position \
             FROM seo_keywords \
             WHERE date BETWEEN $1 AND $2 AND keyword = ANY($3) AND position IS NOT NULL \
             GROUP BY keyword, date \
             ORDER BY date ASC, keyword",
        )
        .bind(start)
        .bind(end)
        .bind(keywords)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get("keyword"), r.get("date"), r.get("avg_position")))
            .collect())
    }
}

fn issue_from_row(row: &PgRow) -> IndexingIssue {
    IndexingIssue {
        id: row.get("id"),
        url: row.get("url"),
        issue_type: row.get("issue_type"),
        severity: row.get("severity"),
        description: row.get("description"),
        detected_date: row.get("detected_date"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}
