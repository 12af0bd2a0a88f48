//! Core repository traits for pagelift abstractions.
//!
//! These traits define the interfaces the Postgres implementations satisfy,
//! keeping handlers testable against alternative backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Repository for landing page CRUD and lifecycle operations.
#[async_trait]
pub trait LandingPageRepository: Send + Sync {
    /// Insert a new page (always created as a draft) and return it.
    async fn create(&self, created_by: Uuid, req: CreateLandingPageRequest) -> Result<LandingPage>;

    /// List pages with filtering, ordering, and pagination.
    async fn list(&self, req: ListLandingPagesRequest) -> Result<Vec<LandingPage>>;

    /// Fetch a page by id.
    async fn get(&self, id: Uuid) -> Result<Option<LandingPage>>;

    /// Fetch a page by slug regardless of publish status.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<LandingPage>>;

    /// Fetch a published page by slug.
    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<LandingPage>>;

    /// Partially update a page; absent fields keep their current values.
    async fn update(&self, id: Uuid, req: UpdateLandingPageRequest) -> Result<Option<LandingPage>>;

    /// Delete a page. Returns false when the id did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Mark a page published, recording the public URL. The first publish
    /// timestamp is retained across re-publishes.
    async fn publish(&self, id: Uuid, published_url: &str) -> Result<Option<LandingPage>>;

    /// Page counts grouped by publish status, optionally scoped to a creator.
    async fn count_by_status(&self, created_by: Option<Uuid>) -> Result<Vec<PageStatusCount>>;
}

/// Repository for lead capture and triage.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert a captured lead with status `new`, returning its id.
    async fn insert(&self, lead: NewLead) -> Result<Uuid>;

    /// List leads with their joined page and assignee summaries, plus the
    /// total count matching the filters.
    async fn list(&self, req: ListLeadsRequest) -> Result<(Vec<LeadDetail>, i64)>;

    /// Fetch one lead with joined summaries.
    async fn get(&self, id: Uuid) -> Result<Option<LeadDetail>>;

    /// Check if a lead exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Update a lead's triage status.
    async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Option<Lead>>;

    /// Assign a lead to a user (stamping assigned_at) or unassign with None.
    async fn assign(&self, id: Uuid, user_id: Option<Uuid>) -> Result<Option<Lead>>;

    /// Flat rows for CSV export, honoring the inbox filters, newest first.
    async fn export_rows(&self, filter: LeadExportFilter) -> Result<Vec<LeadExportRow>>;
}

/// Repository for triage notes attached to leads.
#[async_trait]
pub trait LeadNoteRepository: Send + Sync {
    /// Notes for a lead, newest first, with author summaries.
    async fn list_for_lead(&self, lead_id: Uuid) -> Result<Vec<LeadNote>>;

    /// Attach a note to a lead and return it with the author summary.
    async fn create(&self, lead_id: Uuid, user_id: Uuid, note_text: &str) -> Result<LeadNote>;

    /// Fetch a note by id (no author join).
    async fn get(&self, id: Uuid) -> Result<Option<LeadNote>>;

    /// Delete a note. Returns false when the id did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Repository for admin users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch login credentials by email.
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    /// Fetch a user summary by id.
    async fn get_summary(&self, id: Uuid) -> Result<Option<UserSummary>>;

    /// All users ordered by name (assignment dropdown).
    async fn list(&self) -> Result<Vec<User>>;

    /// Stamp updated_at after a successful login.
    async fn touch(&self, id: Uuid) -> Result<()>;
}

/// Repository for landing page design templates.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Active templates in creation order.
    async fn list_active(&self) -> Result<Vec<PageTemplate>>;

    /// Fetch a template by id (active or not).
    async fn get(&self, id: Uuid) -> Result<Option<PageTemplate>>;
}
