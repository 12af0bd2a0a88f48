//! # pagelift-connect
//!
//! Outbound HTTP integrations for pagelift: Google OAuth2 token plumbing,
//! Search Console analytics queries, GA4 Data API reports, LinkedIn OAuth and
//! post publishing, and WordPress REST publishing.
//!
//! Each client wraps a `reqwest::Client` with a pinned timeout, a `from_env`
//! constructor, and an overridable base URL so tests can point it at a mock
//! server. The heavy lifting (report generation, token issuance) stays on the
//! remote side; these clients only shape requests and decode responses.

pub mod ga4;
pub mod google;
pub mod linkedin;
pub mod search_console;
pub mod wordpress;

pub use ga4::{Ga4DataClient, Ga4ReportRequest, Ga4ReportResponse, Ga4ReportRow};
pub use google::{GoogleOAuthClient, GoogleOAuthConfig, GOOGLE_OAUTH_SCOPES};
pub use linkedin::{LinkedInClient, LinkedInConfig, PublishedUgcPost};
pub use search_console::{
    SearchAnalyticsQuery, SearchAnalyticsRow, SearchConsoleClient, SearchConsoleSite,
};
pub use wordpress::{WordPressClient, WordPressConfig, WordPressPost};
