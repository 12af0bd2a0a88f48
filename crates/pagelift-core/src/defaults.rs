//! Centralized default constants for the pagelift system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates should reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for landing-page list endpoints.
pub const PAGE_LIMIT: i64 = 50;

/// Default page size for the lead inbox.
pub const LEAD_PAGE_LIMIT: i64 = 25;

/// Maximum page size accepted from clients.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

/// Internal "fetch everything" limit for CSV exports and aggregations.
pub const EXPORT_FETCH_LIMIT: i64 = 10_000;

// =============================================================================
// FIELD LENGTH CAPS
// =============================================================================

/// Maximum landing page title length.
pub const MAX_TITLE_LEN: usize = 500;

/// Maximum slug length.
pub const MAX_SLUG_LEN: usize = 255;

/// Maximum headline length.
pub const MAX_HEADLINE_LEN: usize = 500;

/// Maximum subheading length.
pub const MAX_SUBHEADING_LEN: usize = 1000;

/// Maximum call-to-action label length.
pub const MAX_CTA_LEN: usize = 100;

/// Maximum URL field length (hero image, referrer, landing URL).
pub const MAX_URL_LEN: usize = 2048;

/// Maximum lead name/email/company/job-title length.
pub const MAX_LEAD_FIELD_LEN: usize = 255;

/// Maximum lead phone length.
pub const MAX_PHONE_LEN: usize = 50;

/// Maximum free-form lead message length.
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Maximum user-agent length captured with a lead.
pub const MAX_USER_AGENT_LEN: usize = 1000;

/// Maximum lead note length.
pub const MAX_NOTE_LEN: usize = 1000;

/// Maximum LinkedIn post length (LinkedIn's own limit).
pub const MAX_LINKEDIN_POST_LEN: usize = 3000;

// =============================================================================
// AUTH
// =============================================================================

/// JWT lifetime in seconds (24 hours).
pub const JWT_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT issuer claim.
pub const JWT_ISSUER: &str = "pagelift-api";

/// JWT audience claim.
pub const JWT_AUDIENCE: &str = "pagelift-admin";

/// Lifetime of a pending OAuth CSRF state entry (10 minutes).
pub const OAUTH_STATE_TTL_SECS: u64 = 600;

// =============================================================================
// THIRD-PARTY SYNC
// =============================================================================

/// Default lookback window (days) for analytics queries and syncs.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Row limit per Search Console / GA4 report request.
pub const SYNC_ROW_LIMIT: i64 = 1000;

/// Timeout for outbound integration requests (seconds).
pub const INTEGRATION_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum accepted upload size in bytes (5 MB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Public lead-capture submissions allowed per minute.
pub const LEAD_CAPTURE_RATE_PER_MINUTE: u32 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_limits_are_sane() {
        assert!(LEAD_PAGE_LIMIT <= MAX_PAGE_LIMIT);
        assert!(PAGE_LIMIT <= MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_jwt_ttl_is_one_day() {
        assert_eq!(JWT_TTL_SECS, 86_400);
    }
}
