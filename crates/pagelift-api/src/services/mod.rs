//! Service layer: orchestration that spans repositories and integration
//! clients.

pub mod google_sync;

pub use google_sync::{
    access_token_for, sync_ga4_events, sync_ga4_metrics, sync_ga4_page_views, sync_keywords,
    SyncSummary,
};
