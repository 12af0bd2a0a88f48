//! Structured logging schema and field name constants for pagelift.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-row iteration, high-volume data (sync rows, report rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → integration sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "connect"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "lead_capture", "search_console", "ga4", "linkedin"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "submit_lead", "sync_keywords", "publish_post"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Landing page UUID being operated on.
pub const PAGE_ID: &str = "page_id";

/// Lead UUID being operated on.
pub const LEAD_ID: &str = "lead_id";

/// User UUID of the acting principal.
pub const USER_ID: &str = "user_id";

/// GA4 property identifier (e.g. "properties/123456789").
pub const PROPERTY_ID: &str = "property_id";

/// Search Console site URL.
pub const SITE_URL: &str = "site_url";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of rows fetched from a third-party report.
pub const ROWS_FETCHED: &str = "rows_fetched";

/// Number of rows upserted into a snapshot table.
pub const ROWS_STORED: &str = "rows_stored";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
