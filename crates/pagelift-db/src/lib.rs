//! # pagelift-db
//!
//! PostgreSQL database layer for pagelift.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Snapshot tables mirroring Search Console and GA4 report data
//! - Cross-table analytics rollups for the dashboard endpoints
//! - Content-addressed upload storage with a pluggable backend
//!
//! ## Example
//!
//! ```rust,ignore
//! use pagelift_db::Database;
//! use pagelift_core::{LandingPageRepository, CreateLandingPageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/pagelift").await?;
//!
//!     let page = db.landing_pages.create(owner_id, CreateLandingPageRequest {
//!         title: "Spring Sale".to_string(),
//!         slug: "spring-sale".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created page: {}", page.id);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod file_storage;
pub mod ga4;
pub mod google_auth;
pub mod landing_pages;
pub mod lead_notes;
pub mod leads;
pub mod linkedin;
pub mod pool;
pub mod seo;
pub mod templates;
pub mod users;

// Test fixtures for integration tests.
// Note: always compiled so integration tests (in tests/) can use
// DEFAULT_TEST_DATABASE_URL and the schema bootstrap.
pub mod test_fixtures;

// Re-export core types
pub use pagelift_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use analytics::{PageViewAggregates, PgAnalyticsRepository};
pub use file_storage::{
    compute_content_hash, generate_storage_path, FilesystemBackend, PgUploadRepository,
    StorageBackend,
};
pub use ga4::PgGa4Repository;
pub use google_auth::PgGoogleCredentialRepository;
pub use landing_pages::PgLandingPageRepository;
pub use lead_notes::PgLeadNoteRepository;
pub use leads::PgLeadRepository;
pub use linkedin::PgLinkedInRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use seo::PgSeoRepository;
pub use templates::PgTemplateRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Landing page repository for CRUD and publish lifecycle.
    pub landing_pages: PgLandingPageRepository,
    /// Lead repository for capture and triage.
    pub leads: PgLeadRepository,
    /// Lead note repository.
    pub lead_notes: PgLeadNoteRepository,
    /// Admin user repository.
    pub users: PgUserRepository,
    /// Page template repository.
    pub templates: PgTemplateRepository,
    /// Google OAuth credential repository.
    pub google_credentials: PgGoogleCredentialRepository,
    /// GA4 property and snapshot repository.
    pub ga4: PgGa4Repository,
    /// Search Console keyword and indexing-issue repository.
    pub seo: PgSeoRepository,
    /// LinkedIn token and post repository.
    pub linkedin: PgLinkedInRepository,
    /// Cross-table dashboard rollups.
    pub analytics: PgAnalyticsRepository,
    /// Upload repository (requires backend configuration).
    /// Use `with_filesystem_storage` to configure.
    pub uploads: Option<PgUploadRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            landing_pages: PgLandingPageRepository::new(pool.clone()),
            leads: PgLeadRepository::new(pool.clone()),
            lead_notes: PgLeadNoteRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            templates: PgTemplateRepository::new(pool.clone()),
            google_credentials: PgGoogleCredentialRepository::new(pool.clone()),
            ga4: PgGa4Repository::new(pool.clone()),
            seo: PgSeoRepository::new(pool.clone()),
            linkedin: PgLinkedInRepository::new(pool.clone()),
            analytics: PgAnalyticsRepository::new(pool.clone()),
            uploads: None,
            pool,
        }
    }

    /// Connect with default pool settings and build the full context.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Configure upload storage with a filesystem backend path.
    pub fn with_filesystem_storage(mut self, path: &str) -> Self {
        self.uploads = Some(PgUploadRepository::new(
            self.pool.clone(),
            FilesystemBackend::new(path),
        ));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
