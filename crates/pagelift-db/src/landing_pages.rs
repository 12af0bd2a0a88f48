//! Landing page repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{
    new_v7, CreateLandingPageRequest, Error, FormFields, LandingPage, LandingPageRepository,
    ListLandingPagesRequest, PageStatusCount, PublishStatus, Result, UpdateLandingPageRequest,
};

use crate::escape_like;

const PAGE_COLUMNS: &str = "id, title, slug, headline, subheading, body_text, cta_text, \
     hero_image_url, form_fields, publish_status, published_url, published_at, \
     created_by, created_at, updated_at";

/// PostgreSQL implementation of LandingPageRepository.
pub struct PgLandingPageRepository {
    pool: Pool<Postgres>,
}

impl PgLandingPageRepository {
    /// Create a new PgLandingPageRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn page_from_row(row: &PgRow) -> Result<LandingPage> {
    let status_raw: String = row.get("publish_status");
    let publish_status = PublishStatus::parse(&status_raw)
        .ok_or_else(|| Error::Internal(format!("unknown publish_status '{}'", status_raw)))?;

    let form_fields: FormFields = serde_json::from_value(row.get("form_fields"))
        .map_err(|e| Error::Serialization(format!("form_fields: {}", e)))?;

    Ok(LandingPage {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        headline: row.get("headline"),
        subheading: row.get("subheading"),
        body_text: row.get("body_text"),
        cta_text: row.get("cta_text"),
        hero_image_url: row.get("hero_image_url"),
        form_fields,
        publish_status,
        published_url: row.get("published_url"),
        published_at: row.get("published_at"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Map a unique-violation on the slug index to a friendly conflict error.
fn map_slug_conflict(err: sqlx::Error, slug: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some("landing_pages_slug_key") {
            return Error::Conflict(format!(
                "A landing page with slug \"{}\" already exists",
                slug
            ));
        }
    }
    Error::Database(err)
}

#[async_trait]
impl LandingPageRepository for PgLandingPageRepository {
    async fn create(&self, created_by: Uuid, req: CreateLandingPageRequest) -> Result<LandingPage> {
        let id = new_v7();
        let now = Utc::now();
        let cta_text = req.cta_text.unwrap_or_else(|| "Submit".to_string());
        let form_fields = req
            .form_fields
            .unwrap_or_else(FormFields::default_lead_form);
        let form_fields_json = serde_json::to_value(&form_fields)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO landing_pages (
                id, title, slug, headline, subheading, body_text, cta_text,
                hero_image_url, form_fields, publish_status, created_by,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.headline)
        .bind(&req.subheading)
        .bind(&req.body_text)
        .bind(&cta_text)
        .bind(&req.hero_image_url)
        .bind(&form_fields_json)
        .bind(PublishStatus::Draft.as_str())
        .bind(created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_slug_conflict(e, &req.slug))?;

        page_from_row(&row)
    }

    async fn list(&self, req: ListLandingPagesRequest) -> Result<Vec<LandingPage>> {
        let mut sql = format!("SELECT {PAGE_COLUMNS} FROM landing_pages WHERE 1=1");
        let mut param = 0;

        if req.publish_status.is_some() {
            param += 1;
            sql.push_str(&format!(" AND publish_status = ${param}"));
        }
        if req.created_by.is_some() {
            param += 1;
            sql.push_str(&format!(" AND created_by = ${param}"));
        }
        if req.search.is_some() {
            param += 1;
            sql.push_str(&format!(
                " AND (title ILIKE ${param} OR slug ILIKE ${param} OR headline ILIKE ${param})"
            ));
        }

        sql.push_str(&format!(
            " ORDER BY {} {}",
            req.order_by.column(),
            req.order_dir.sql()
        ));
        sql.push_str(&format!(" LIMIT ${} OFFSET ${}", param + 1, param + 2));

        let mut query = sqlx::query(&sql);
        if let Some(status) = req.publish_status {
            query = query.bind(status.as_str());
        }
        if let Some(created_by) = req.created_by {
            query = query.bind(created_by);
        }
        if let Some(search) = &req.search {
            query = query.bind(format!("%{}%", escape_like(search)));
        }
        query = query
            .bind(req.limit.unwrap_or(pagelift_core::defaults::PAGE_LIMIT))
            .bind(req.offset.unwrap_or(pagelift_core::defaults::PAGE_OFFSET));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(page_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<LandingPage>> {
        let row = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<LandingPage>> {
        let row = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<LandingPage>> {
        let row = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE slug = $1 AND publish_status = $2"
        ))
        .bind(slug)
        .bind(PublishStatus::Published.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn update(&self, id: Uuid, req: UpdateLandingPageRequest) -> Result<Option<LandingPage>> {
        let now = Utc::now();
        let slug_for_conflict = req.slug.clone().unwrap_or_default();
        let form_fields_json = match &req.form_fields {
            Some(ff) => Some(serde_json::to_value(ff)?),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE landing_pages
            SET
                title = COALESCE($1, title),
                slug = COALESCE($2, slug),
                headline = COALESCE($3, headline),
                subheading = COALESCE($4, subheading),
                body_text = COALESCE($5, body_text),
                cta_text = COALESCE($6, cta_text),
                hero_image_url = COALESCE($7, hero_image_url),
                form_fields = COALESCE($8, form_fields),
                updated_at = $9
            WHERE id = $10
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.headline)
        .bind(&req.subheading)
        .bind(&req.body_text)
        .bind(&req.cta_text)
        .bind(&req.hero_image_url)
        .bind(&form_fields_json)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_slug_conflict(e, &slug_for_conflict))?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM landing_pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn publish(&self, id: Uuid, published_url: &str) -> Result<Option<LandingPage>> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            UPDATE landing_pages
            SET
                publish_status = $1,
                published_url = $2,
                published_at = COALESCE(published_at, $3),
                updated_at = $3
            WHERE id = $4
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(PublishStatus::Published.as_str())
        .bind(published_url)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn count_by_status(&self, created_by: Option<Uuid>) -> Result<Vec<PageStatusCount>> {
        let rows = match created_by {
            Some(user_id) => {
                sqlx::query(
                    "SELECT publish_status, COUNT(*) AS count FROM landing_pages \
                     WHERE created_by = $1 GROUP BY publish_status",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT publish_status, COUNT(*) AS count FROM landing_pages \
                     GROUP BY publish_status",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                let status_raw: String = r.get("publish_status");
                let status = PublishStatus::parse(&status_raw).ok_or_else(|| {
                    Error::Internal(format!("unknown publish_status '{}'", status_raw))
                })?;
                Ok(PageStatusCount {
                    status,
                    count: r.get("count"),
                })
            })
            .collect()
    }
}
