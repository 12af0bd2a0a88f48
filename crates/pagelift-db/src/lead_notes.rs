//! Lead note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{new_v7, Error, LeadNote, LeadNoteRepository, Result, UserSummary};

/// PostgreSQL implementation of LeadNoteRepository.
pub struct PgLeadNoteRepository {
    pool: Pool<Postgres>,
}

impl PgLeadNoteRepository {
    /// Create a new PgLeadNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_with_author(row: &PgRow) -> LeadNote {
    let user = row
        .get::<Option<Uuid>, _>("author_id")
        .map(|id| UserSummary {
            id,
            name: row.get("author_name"),
            email: row.get("author_email"),
        });

    LeadNote {
        id: row.get("id"),
        lead_id: row.get("lead_id"),
        user_id: row.get("user_id"),
        note_text: row.get("note_text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        user,
    }
}

#[async_trait]
impl LeadNoteRepository for PgLeadNoteRepository {
    async fn list_for_lead(&self, lead_id: Uuid) -> Result<Vec<LeadNote>> {
        let rows = sqlx::query(
            r#"
            SELECT
                lead_notes.id, lead_notes.lead_id, lead_notes.user_id,
                lead_notes.note_text, lead_notes.created_at, lead_notes.updated_at,
                users.id AS author_id, users.name AS author_name, users.email AS author_email
            FROM lead_notes
            LEFT JOIN users ON lead_notes.user_id = users.id
            WHERE lead_notes.lead_id = $1
            ORDER BY lead_notes.created_at DESC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(note_with_author).collect())
    }

    async fn create(&self, lead_id: Uuid, user_id: Uuid, note_text: &str) -> Result<LeadNote> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO lead_notes (id, lead_id, user_id, note_text, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(id)
        .bind(lead_id)
        .bind(user_id)
        .bind(note_text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query(
            r#"
            SELECT
                lead_notes.id, lead_notes.lead_id, lead_notes.user_id,
                lead_notes.note_text, lead_notes.created_at, lead_notes.updated_at,
                users.id AS author_id, users.name AS author_name, users.email AS author_email
            FROM lead_notes
            LEFT JOIN users ON lead_notes.user_id = users.id
            WHERE lead_notes.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(note_with_author(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadNote>> {
        let row = sqlx::query(
            "SELECT id, lead_id, user_id, note_text, created_at, updated_at \
             FROM lead_notes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| LeadNote {
            id: r.get("id"),
            lead_id: r.get("lead_id"),
            user_id: r.get("user_id"),
            note_text: r.get("note_text"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
            user: None,
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lead_notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
