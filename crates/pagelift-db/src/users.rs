//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{
    Error, Result, User, UserCredentials, UserRepository, UserRole, UserSummary,
};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_role(raw: &str) -> Result<UserRole> {
    UserRole::parse(raw).ok_or_else(|| Error::Internal(format!("unknown user role '{}'", raw)))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| {
            let role_raw: String = r.get("role");
            Ok(UserCredentials {
                id: r.get("id"),
                name: r.get("name"),
                email: r.get("email"),
                password_hash: r.get("password_hash"),
                role: parse_role(&role_raw)?,
            })
        })
        .transpose()
    }

    async fn get_summary(&self, id: Uuid) -> Result<Option<UserSummary>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| UserSummary {
            id: r.get("id"),
            name: r.get("name"),
            email: r.get("email"),
        }))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, email, role, created_at, updated_at FROM users ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                let role_raw: String = r.get("role");
                Ok(User {
                    id: r.get("id"),
                    name: r.get("name"),
                    email: r.get("email"),
                    role: parse_role(&role_raw)?,
                    created_at: r.get("created_at"),
                    updated_at: r.get("updated_at"),
                })
            })
            .collect()
    }

    async fn touch(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
