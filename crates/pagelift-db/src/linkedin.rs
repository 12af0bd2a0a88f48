//! LinkedIn token and post repository implementation.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{new_v7, Error, LinkedInConnection, LinkedInPost, LinkedInProfile, Result};

/// PostgreSQL repository for LinkedIn OAuth tokens and published posts.
pub struct PgLinkedInRepository {
    pool: Pool<Postgres>,
}

fn connection_from_row(row: &PgRow) -> LinkedInConnection {
    LinkedInConnection {
        user_id: row.get("user_id"),
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        expires_at: row.get("expires_at"),
        scope: row.get("scope"),
        linkedin_user_id: row.get("linkedin_user_id"),
        linkedin_user_name: row.get("linkedin_user_name"),
        linkedin_user_email: row.get("linkedin_user_email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn post_from_row(row: &PgRow) -> LinkedInPost {
    LinkedInPost {
        id: row.get("id"),
        user_id: row.get("user_id"),
        linkedin_post_id: row.get("linkedin_post_id"),
        post_content: row.get("post_content"),
        post_url: row.get("post_url"),
        image_url: row.get("image_url"),
        linkedin_urn: row.get("linkedin_urn"),
        status: row.get("status"),
        published_at: row.get("published_at"),
    }
}

impl PgLinkedInRepository {
    /// Create a new PgLinkedInRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store tokens and profile identity for a user, replacing any existing
    /// connection.
    pub async fn upsert_tokens(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
        scope: Option<&str>,
        profile: &LinkedInProfile,
    ) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO linkedin_oauth_tokens
                (user_id, access_token, refresh_token, expires_at, scope,
                 linkedin_user_id, linkedin_user_name, linkedin_user_email,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ON CONFLICT (user_id)
            DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at,
                scope = EXCLUDED.scope,
                linkedin_user_id = EXCLUDED.linkedin_user_id,
                linkedin_user_name = EXCLUDED.linkedin_user_name,
                linkedin_user_email = EXCLUDED.linkedin_user_email,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(scope)
        .bind(&profile.linkedin_user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Fetch a user's connection, if any.
    pub async fn get_connection(&self, user_id: Uuid) -> Result<Option<LinkedInConnection>> {
        let row = sqlx::query(
            "SELECT user_id, access_token, refresh_token, expires_at, scope, \
             linkedin_user_id, linkedin_user_name, linkedin_user_email, \
             created_at, updated_at \
             FROM linkedin_oauth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(connection_from_row))
    }

    /// Delete a user's connection (disconnect).
    pub async fn delete_tokens(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM linkedin_oauth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Record a post that was published to LinkedIn.
    #[allow(clippy::too_many_arguments)]
    pub async fn save_post(
        &self,
        user_id: Uuid,
        linkedin_post_id: &str,
        content: &str,
        post_url: Option<&str>,
        image_url: Option<&str>,
        linkedin_urn: &str,
    ) -> Result<LinkedInPost> {
        let row = sqlx::query(
            r#"
            INSERT INTO linkedin_posts
                (id, user_id, linkedin_post_id, post_content, post_url, image_url,
                 linkedin_urn, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'published', $8)
            RETURNING id, user_id, linkedin_post_id, post_content, post_url, image_url,
                      linkedin_urn, status, published_at
            "#,
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(linkedin_post_id)
        .bind(content)
        .bind(post_url)
        .bind(image_url)
        .bind(linkedin_urn)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(post_from_row(&row))
    }

    /// A user's post history, newest first.
    pub async fn post_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LinkedInPost>> {
        let rows = sqlx::query(
            "SELECT id, user_id, linkedin_post_id, post_content, post_url, image_url, \
             linkedin_urn, status, published_at \
             FROM linkedin_posts \
             WHERE user_id = $1 \
             ORDER BY published_at DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    /// Total posts published by a user.
    pub async fn post_count(&self, user_id: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM linkedin_posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("count"))
    }

    /// Posts published by a user in the last `days` days.
    pub async fn post_count_since_days(&self, user_id: Uuid, days: i32) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM linkedin_posts \
             WHERE user_id = $1 AND published_at >= NOW() - make_interval(days => $2)",
        )
        .bind(user_id)
        .bind(days)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("count"))
    }
}
