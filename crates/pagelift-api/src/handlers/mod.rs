//! HTTP handlers for pagelift-api.

pub mod analytics;
pub mod auth;
pub mod ga4;
pub mod google_oauth;
pub mod health;
pub mod integrated;
pub mod landing_pages;
pub mod lead_notes;
pub mod leads;
pub mod linkedin;
pub mod public;
pub mod search_console;
pub mod seo_dashboard;
pub mod templates;
pub mod uploads;
pub mod users;

use chrono::{Duration, NaiveDate, Utc};

/// Resolve an optional `days` query parameter against the default lookback.
pub(crate) fn lookback_days(days: Option<i64>) -> i64 {
    let days = days.unwrap_or(pagelift_core::defaults::DEFAULT_LOOKBACK_DAYS);
    days.clamp(1, 365)
}

/// Date range covering the last `days` days, ending today.
pub(crate) fn range_from_days(days: i64) -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days);
    (start, end)
}

/// Parse an optional `YYYY-MM-DD` query parameter, falling back to the
/// default range bound.
pub(crate) fn parse_date_or(value: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    value
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_days_defaults_and_clamps() {
        assert_eq!(lookback_days(None), 30);
        assert_eq!(lookback_days(Some(7)), 7);
        assert_eq!(lookback_days(Some(0)), 1);
        assert_eq!(lookback_days(Some(10_000)), 365);
    }

    #[test]
    fn test_range_from_days_spans_requested_window() {
        let (start, end) = range_from_days(30);
        assert_eq!((end - start).num_days(), 30);
    }

    #[test]
    fn test_parse_date_or() {
        let fallback = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            parse_date_or(Some("2026-07-15"), fallback),
            NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()
        );
        assert_eq!(parse_date_or(Some("garbage"), fallback), fallback);
        assert_eq!(parse_date_or(None, fallback), fallback);
    }
}
