//! Page template repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{Error, PageTemplate, Result, TemplateRepository};

/// PostgreSQL implementation of TemplateRepository.
pub struct PgTemplateRepository {
    pool: Pool<Postgres>,
}

impl PgTemplateRepository {
    /// Create a new PgTemplateRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn template_from_row(row: &PgRow) -> PageTemplate {
    PageTemplate {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        thumbnail_url: row.get("thumbnail_url"),
        html_structure: row.get("html_structure"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn list_active(&self) -> Result<Vec<PageTemplate>> {
        let rows = sqlx::query(
            "SELECT id, name, description, thumbnail_url, html_structure, is_active, created_at \
             FROM templates WHERE is_active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(template_from_row).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PageTemplate>> {
        let row = sqlx::query(
            "SELECT id, name, description, thumbnail_url, html_structure, is_active, created_at \
             FROM templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(template_from_row))
    }
}
