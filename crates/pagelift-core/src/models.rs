//! Domain models for pagelift.
//!
//! These structs are the shared vocabulary between the HTTP layer, the
//! Postgres repositories, and the third-party integration clients. Database
//! rows map onto them 1:1; response-only aggregate shapes (dashboards,
//! joined summaries) live here too so handlers stay thin.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// USERS & ROLES
// =============================================================================

/// Role attached to an admin user. Controls write access to landing pages
/// and leads; viewers get read-only access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

/// An admin user, as exposed over the API (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user reference embedded in joined responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Full credential row used only by the login flow.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

// =============================================================================
// LANDING PAGES
// =============================================================================

/// Landing page publish lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PublishStatus::Draft),
            "published" => Some(PublishStatus::Published),
            "archived" => Some(PublishStatus::Archived),
            _ => None,
        }
    }
}

/// A single input in a landing page's lead form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Lead form configuration stored as jsonb on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFields {
    pub fields: Vec<FormField>,
}

impl FormFields {
    /// The form applied when a page is created without one:
    /// name + email (required) and an optional phone.
    pub fn default_lead_form() -> Self {
        FormFields {
            fields: vec![
                FormField {
                    name: "name".to_string(),
                    label: "Full Name".to_string(),
                    field_type: "text".to_string(),
                    required: true,
                    placeholder: Some("Enter your name".to_string()),
                },
                FormField {
                    name: "email".to_string(),
                    label: "Email Address".to_string(),
                    field_type: "email".to_string(),
                    required: true,
                    placeholder: Some("your@email.com".to_string()),
                },
                FormField {
                    name: "phone".to_string(),
                    label: "Phone Number".to_string(),
                    field_type: "tel".to_string(),
                    required: false,
                    placeholder: Some("+1 (555) 000-0000".to_string()),
                },
            ],
        }
    }

    /// True when at least one field captures an email address.
    pub fn has_email_field(&self) -> bool {
        self.fields.iter().any(|f| f.field_type == "email")
    }
}

/// A marketing landing page with content fields and a publish lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPage {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub headline: Option<String>,
    pub subheading: Option<String>,
    pub body_text: Option<String>,
    pub cta_text: String,
    pub hero_image_url: Option<String>,
    pub form_fields: FormFields,
    pub publish_status: PublishStatus,
    pub published_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact page reference embedded in lead responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPageSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub published_url: Option<String>,
    pub publish_status: PublishStatus,
}

/// Request for creating a new landing page.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLandingPageRequest {
    pub title: String,
    pub slug: String,
    pub headline: Option<String>,
    pub subheading: Option<String>,
    pub body_text: Option<String>,
    pub cta_text: Option<String>,
    pub hero_image_url: Option<String>,
    pub form_fields: Option<FormFields>,
}

/// Partial update for a landing page; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLandingPageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub headline: Option<String>,
    pub subheading: Option<String>,
    pub body_text: Option<String>,
    pub cta_text: Option<String>,
    pub hero_image_url: Option<String>,
    pub form_fields: Option<FormFields>,
}

/// Sort column for landing page listings (whitelisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrderBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    PublishStatus,
}

impl PageOrderBy {
    pub fn column(&self) -> &'static str {
        match self {
            PageOrderBy::CreatedAt => "created_at",
            PageOrderBy::UpdatedAt => "updated_at",
            PageOrderBy::Title => "title",
            PageOrderBy::PublishStatus => "publish_status",
        }
    }

    /// Unknown columns fall back to `created_at` rather than erroring.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "updated_at" => PageOrderBy::UpdatedAt,
            "title" => PageOrderBy::Title,
            "publish_status" => PageOrderBy::PublishStatus,
            _ => PageOrderBy::CreatedAt,
        }
    }
}

/// Sort direction shared by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Filter and pagination options for landing page listings.
#[derive(Debug, Clone, Default)]
pub struct ListLandingPagesRequest {
    pub publish_status: Option<PublishStatus>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: PageOrderBy,
    pub order_dir: SortOrder,
}

/// Per-status page counts for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PageStatusCount {
    pub status: PublishStatus,
    pub count: i64,
}

// =============================================================================
// LEADS
// =============================================================================

/// Lead triage pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    InProgress,
    Converted,
    ClosedWon,
    ClosedLost,
    Unqualified,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 8] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::InProgress,
        LeadStatus::Converted,
        LeadStatus::ClosedWon,
        LeadStatus::ClosedLost,
        LeadStatus::Unqualified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::InProgress => "in_progress",
            LeadStatus::Converted => "converted",
            LeadStatus::ClosedWon => "closed_won",
            LeadStatus::ClosedLost => "closed_lost",
            LeadStatus::Unqualified => "unqualified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// A captured lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub landing_page_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub source: String,
    pub source_details: Option<String>,
    pub referrer_url: Option<String>,
    pub landing_url: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lead with the joined landing page and assignee summaries, as returned by
/// the admin inbox.
#[derive(Debug, Clone, Serialize)]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub landing_page: Option<LandingPageSummary>,
    pub assigned_user: Option<UserSummary>,
}

/// Raw public form submission. Form fields beyond the well-known ones are
/// retained so required-field validation can run against the page's form
/// configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitLeadRequest {
    pub landing_page_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub message: Option<String>,
    /// Honeypot: any value here marks the submission as spam.
    pub website: Option<String>,
    pub user_agent: Option<String>,
    pub referrer_url: Option<String>,
    pub landing_url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl SubmitLeadRequest {
    /// Value of a form field by name, checking well-known fields first.
    pub fn field_value(&self, name: &str) -> Option<String> {
        let known = match name {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "company" => self.company.clone(),
            "job_title" => self.job_title.clone(),
            "message" => self.message.clone(),
            _ => None,
        };
        known.or_else(|| {
            self.extra.get(name).map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
    }
}

/// Sanitized insert payload produced by the capture pipeline.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub landing_page_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub message: Option<String>,
    pub source: String,
    pub source_details: Option<String>,
    pub referrer_url: Option<String>,
    pub landing_url: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Assignment filter for the lead inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedFilter {
    Unassigned,
    Assigned,
    User(Uuid),
}

/// Sort column for the lead inbox (whitelisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadOrderBy {
    Name,
    Email,
    #[default]
    CreatedAt,
    Status,
}

impl LeadOrderBy {
    pub fn column(&self) -> &'static str {
        match self {
            LeadOrderBy::Name => "name",
            LeadOrderBy::Email => "email",
            LeadOrderBy::CreatedAt => "created_at",
            LeadOrderBy::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(LeadOrderBy::Name),
            "email" => Some(LeadOrderBy::Email),
            "created_at" => Some(LeadOrderBy::CreatedAt),
            "status" => Some(LeadOrderBy::Status),
            _ => None,
        }
    }
}

/// Filter, sort, and pagination options for the lead inbox.
#[derive(Debug, Clone, Default)]
pub struct ListLeadsRequest {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub landing_page_id: Option<Uuid>,
    pub status: Option<LeadStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub assigned_to: Option<AssignedFilter>,
    pub sort_by: LeadOrderBy,
    pub sort_order: SortOrder,
}

/// Subset of the list filters honored by the CSV export.
#[derive(Debug, Clone, Default)]
pub struct LeadExportFilter {
    pub search: Option<String>,
    pub landing_page_id: Option<Uuid>,
    pub status: Option<LeadStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Flat row shape for the lead CSV export.
#[derive(Debug, Clone)]
pub struct LeadExportRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub landing_page_title: Option<String>,
    pub source: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Pagination {
            page,
            limit,
            total,
            pages,
            has_next: page < pages,
            has_previous: page > 1,
        }
    }
}

// =============================================================================
// LEAD NOTES
// =============================================================================

/// A triage note attached to a lead, with its author.
#[derive(Debug, Clone, Serialize)]
pub struct LeadNote {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Uuid,
    pub note_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// A reusable landing page design template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub html_structure: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// GOOGLE CREDENTIALS
// =============================================================================

/// Stored Google OAuth tokens for a user.
#[derive(Debug, Clone)]
pub struct GoogleCredential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expiry: DateTime<Utc>,
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoogleCredential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry <= now
    }
}

/// Token set returned from a code exchange or refresh.
#[derive(Debug, Clone)]
pub struct GoogleTokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

/// Connection status surfaced to the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

// =============================================================================
// GA4 SNAPSHOTS
// =============================================================================

/// A GA4 property registered for sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ga4Property {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: String,
    pub property_name: Option<String>,
    pub website_url: Option<String>,
    pub timezone: Option<String>,
    pub currency_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register (or refresh) a GA4 property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGa4PropertyRequest {
    pub property_id: String,
    pub property_name: Option<String>,
    pub website_url: Option<String>,
    pub timezone: Option<String>,
    pub currency_code: Option<String>,
}

/// One day of mirrored GA4 site metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ga4DailyMetrics {
    pub property_id: String,
    pub date: NaiveDate,
    pub users: i64,
    pub new_users: i64,
    pub sessions: i64,
    pub engaged_sessions: i64,
    pub engagement_rate: f64,
    pub avg_session_duration: f64,
    pub pages_per_session: f64,
    pub bounce_rate: f64,
    pub conversions: i64,
    pub total_revenue: f64,
    pub desktop_users: i64,
    pub mobile_users: i64,
    pub tablet_users: i64,
}

/// One day of mirrored GA4 per-page metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ga4PageViewRow {
    pub property_id: String,
    pub date: NaiveDate,
    pub page_path: String,
    pub page_title: Option<String>,
    pub views: i64,
    pub unique_views: i64,
    pub avg_time_on_page: f64,
    pub entrances: i64,
    pub exits: i64,
    pub exit_rate: f64,
}

/// One day of mirrored GA4 per-event metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ga4EventRow {
    pub property_id: String,
    pub date: NaiveDate,
    pub event_name: String,
    pub event_count: i64,
    pub unique_users: i64,
    pub event_value: f64,
    pub conversion_count: i64,
}

/// Aggregated totals for the GA4 dashboard endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ga4SummaryTotals {
    pub total_users: i64,
    pub total_new_users: i64,
    pub total_sessions: i64,
    pub avg_engagement_rate: f64,
    pub avg_session_duration: f64,
    pub total_conversions: i64,
    pub total_revenue: f64,
    pub desktop_users: i64,
    pub mobile_users: i64,
    pub tablet_users: i64,
}

/// A page rollup for the GA4 dashboard endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Ga4TopPage {
    pub page_path: String,
    pub page_title: Option<String>,
    pub total_views: i64,
}

/// An event rollup for the GA4 dashboard endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Ga4TopEvent {
    pub event_name: String,
    pub total_count: i64,
}

/// Date range echoed back by analytics endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// =============================================================================
// SEO KEYWORDS & INDEXING
// =============================================================================

/// One Search Console keyword sample for a (keyword, url, date) cell.
#[derive(Debug, Clone)]
pub struct SeoKeywordUpsert {
    pub keyword: String,
    pub url: Option<String>,
    pub impressions: i64,
    pub clicks: i64,
    /// Click-through rate, stored as a percentage (0..=100).
    pub ctr: f64,
    pub position: Option<f64>,
    pub date: NaiveDate,
    pub country: Option<String>,
    pub device: Option<String>,
}

/// Per-(keyword, url) aggregate across a date range.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordPerformance {
    pub keyword: String,
    pub url: Option<String>,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub avg_ctr: f64,
    pub avg_position: Option<f64>,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub data_points: i64,
}

/// One day in a keyword's ranking trend.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordTrendPoint {
    pub date: NaiveDate,
    pub avg_position: Option<f64>,
    pub impressions: i64,
    pub clicks: i64,
    pub ctr: f64,
}

/// Rollup for the top-keywords endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TopKeyword {
    pub keyword: String,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub avg_ctr: f64,
    pub avg_position: Option<f64>,
}

/// Metric used to rank top keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordSortBy {
    #[default]
    Clicks,
    Impressions,
    Ctr,
}

impl KeywordSortBy {
    /// Aggregate column the sort maps onto.
    pub fn column(&self) -> &'static str {
        match self {
            KeywordSortBy::Clicks => "total_clicks",
            KeywordSortBy::Impressions => "total_impressions",
            KeywordSortBy::Ctr => "avg_ctr",
        }
    }

    /// Unknown metrics fall back to clicks.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "impressions" => KeywordSortBy::Impressions,
            "ctr" => KeywordSortBy::Ctr,
            _ => KeywordSortBy::Clicks,
        }
    }
}

/// A keyword whose average position worsened between the two halves of the
/// comparison window (position grows as rank declines).
#[derive(Debug, Clone, Serialize)]
pub struct DecliningKeyword {
    pub keyword: String,
    pub recent_position: f64,
    pub older_position: f64,
    pub position_change: f64,
}

/// Filters for the keyword aggregate listing and export.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub keyword: Option<String>,
    pub url: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// An indexing problem reported for a URL.
#[derive(Debug, Clone, Serialize)]
pub struct IndexingIssue {
    pub id: Uuid,
    pub url: String,
    pub issue_type: String,
    pub severity: String,
    pub description: Option<String>,
    pub detected_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload for a detected indexing issue.
#[derive(Debug, Clone)]
pub struct IndexingIssueUpsert {
    pub url: String,
    pub issue_type: String,
    pub severity: String,
    pub description: Option<String>,
    pub detected_date: NaiveDate,
    pub status: String,
}

// =============================================================================
// LINKEDIN
// =============================================================================

/// Stored LinkedIn OAuth tokens and profile identity for a user.
#[derive(Debug, Clone)]
pub struct LinkedInConnection {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
    pub linkedin_user_id: String,
    pub linkedin_user_name: Option<String>,
    pub linkedin_user_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedInConnection {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A post published through the LinkedIn integration.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedInPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub linkedin_post_id: String,
    pub post_content: String,
    pub post_url: Option<String>,
    pub image_url: Option<String>,
    pub linkedin_urn: String,
    pub status: String,
    pub published_at: DateTime<Utc>,
}

/// LinkedIn profile identity from the OpenID userinfo endpoint.
#[derive(Debug, Clone)]
pub struct LinkedInProfile {
    pub linkedin_user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// UPLOADS
// =============================================================================

/// A stored image upload.
#[derive(Debug, Clone, Serialize)]
pub struct Upload {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub content_hash: String,
    pub storage_path: String,
    pub public_url: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// DASHBOARDS
// =============================================================================

/// Headline numbers for the lead analytics dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDashboardTotals {
    pub total_leads: i64,
    pub new_leads: i64,
    pub converted_leads: i64,
    pub conversion_rate: f64,
    pub assigned_leads: i64,
    pub unassigned_leads: i64,
}

/// One status bucket in the lead funnel breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct LeadStatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

/// One day in a leads-over-time series.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// A landing page ranked by captured leads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLandingPage {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub lead_count: i64,
}

/// Full lead analytics dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDashboard {
    pub totals: LeadDashboardTotals,
    pub status_breakdown: Vec<LeadStatusCount>,
    pub leads_over_time: Vec<DailyCount>,
    pub top_landing_pages: Vec<TopLandingPage>,
}

/// Keyword rollup block for the unified SEO dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMetrics {
    pub total_keywords: i64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub avg_ctr: f64,
    pub avg_position: f64,
}

/// One day in the unified dashboard's traffic trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficTrendPoint {
    pub date: NaiveDate,
    pub page_views: i64,
    pub unique_views: i64,
    pub avg_time: f64,
}

/// Lead funnel block shared by the SEO and integrated dashboards.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFunnel {
    pub total_leads: i64,
    pub new_leads: i64,
    pub contacted_leads: i64,
    pub qualified_leads: i64,
    pub converted_leads: i64,
}

/// Per-date average positions of the top keywords, keyed by keyword.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordRankingTrendPoint {
    pub date: NaiveDate,
    pub positions: HashMap<String, f64>,
}

/// A page rollup for the unified SEO dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoTopPage {
    pub page_path: String,
    pub page_title: Option<String>,
    pub views: i64,
    pub unique_views: i64,
    pub avg_time: f64,
    pub exit_rate: f64,
}
