//! Google OAuth credential repository implementation.
//!
//! One row per user (`user_id` is unique); code exchange and refresh both
//! upsert through the same path.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{new_v7, Error, GoogleCredential, GoogleTokenSet, Result};

/// PostgreSQL repository for stored Google OAuth tokens.
pub struct PgGoogleCredentialRepository {
    pool: Pool<Postgres>,
}

fn credential_from_row(row: &PgRow) -> GoogleCredential {
    GoogleCredential {
        id: row.get("id"),
        user_id: row.get("user_id"),
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        token_expiry: row.get("token_expiry"),
        scope: row.get("scope"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgGoogleCredentialRepository {
    /// Create a new PgGoogleCredentialRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a token set for a user, replacing any existing row.
    ///
    /// A refresh response may omit the refresh token; the stored one is kept
    /// in that case.
    pub async fn upsert(&self, user_id: Uuid, tokens: &GoogleTokenSet) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO google_credentials
                (id, user_id, access_token, refresh_token, token_expiry, scope, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (user_id)
            DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = COALESCE(EXCLUDED.refresh_token, google_credentials.refresh_token),
                token_expiry = EXCLUDED.token_expiry,
                scope = EXCLUDED.scope,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expiry)
        .bind(&tokens.scope)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Update only the access token and expiry after a refresh.
    pub async fn update_access_token(
        &self,
        user_id: Uuid,
        access_token: &str,
        token_expiry: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE google_credentials \
             SET access_token = $1, token_expiry = $2, updated_at = $3 \
             WHERE user_id = $4",
        )
        .bind(access_token)
        .bind(token_expiry)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Fetch a user's stored credential.
    pub async fn get(&self, user_id: Uuid) -> Result<Option<GoogleCredential>> {
        let row = sqlx::query(
            "SELECT id, user_id, access_token, refresh_token, token_expiry, scope, \
             created_at, updated_at \
             FROM google_credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(credential_from_row))
    }

    /// Delete a user's stored credential. Returns false when none existed.
    pub async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM google_credentials WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
