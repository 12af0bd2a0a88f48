//! GA4 Data API client (`runReport`).
//!
//! Request and response shapes follow the v1beta Data API. The sync service
//! builds the three standard reports (daily metrics, page views, events) and
//! folds the rows into the snapshot tables.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use pagelift_core::defaults::{INTEGRATION_TIMEOUT_SECS, SYNC_ROW_LIMIT};
use pagelift_core::{Error, Result};

/// Default GA4 Data API base.
pub const DEFAULT_BASE_URL: &str = "https://analyticsdata.googleapis.com/v1beta";

/// A dimension or metric reference by name.
#[derive(Debug, Clone, Serialize)]
pub struct NamedField {
    pub name: String,
}

impl NamedField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// A report date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDateRange {
    pub start_date: String,
    pub end_date: String,
}

/// `runReport` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ga4ReportRequest {
    pub date_ranges: Vec<ReportDateRange>,
    pub dimensions: Vec<NamedField>,
    pub metrics: Vec<NamedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl Ga4ReportRequest {
    /// Build a request over one date range with the given dimension and
    /// metric names.
    pub fn new(start_date: &str, end_date: &str, dimensions: &[&str], metrics: &[&str]) -> Self {
        Self {
            date_ranges: vec![ReportDateRange {
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            }],
            dimensions: dimensions.iter().map(|d| NamedField::new(d)).collect(),
            metrics: metrics.iter().map(|m| NamedField::new(m)).collect(),
            limit: Some(SYNC_ROW_LIMIT),
        }
    }
}

/// A single dimension or metric cell.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportValue {
    #[serde(default)]
    pub value: String,
}

/// One report row: dimension values then metric values, in request order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ga4ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<ReportValue>,
    #[serde(default)]
    pub metric_values: Vec<ReportValue>,
}

impl Ga4ReportRow {
    /// Dimension cell by index, empty string when absent.
    pub fn dimension(&self, idx: usize) -> &str {
        self.dimension_values
            .get(idx)
            .map(|v| v.value.as_str())
            .unwrap_or("")
    }

    /// Metric cell parsed as i64, zero when absent or unparseable.
    pub fn metric_i64(&self, idx: usize) -> i64 {
        self.metric_values
            .get(idx)
            .and_then(|v| v.value.parse::<f64>().ok())
            .map(|v| v as i64)
            .unwrap_or(0)
    }

    /// Metric cell parsed as f64, zero when absent or unparseable.
    pub fn metric_f64(&self, idx: usize) -> f64 {
        self.metric_values
            .get(idx)
            .and_then(|v| v.value.parse().ok())
            .unwrap_or(0.0)
    }
}

/// `runReport` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Ga4ReportResponse {
    #[serde(default)]
    pub rows: Vec<Ga4ReportRow>,
}

/// GA4 Data API client.
pub struct Ga4DataClient {
    client: Client,
    base_url: String,
}

impl Default for Ga4DataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Ga4DataClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(INTEGRATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Run a report for a property (`properties/123456789`).
    ///
    /// Google's error status (PERMISSION_DENIED, NOT_FOUND, UNAUTHENTICATED)
    /// is preserved in the error message so the API layer can map it onto an
    /// HTTP status.
    pub async fn run_report(
        &self,
        access_token: &str,
        property_id: &str,
        request: &Ga4ReportRequest,
    ) -> Result<Ga4ReportResponse> {
        let url = format!("{}/{}:runReport", self.base_url, property_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "GA4 runReport failed ({}): {}",
                status, body
            )));
        }

        let parsed: Ga4ReportResponse = response.json().await?;
        debug!(
            subsystem = "connect",
            component = "ga4",
            op = "run_report",
            property_id = %property_id,
            rows_fetched = parsed.rows.len(),
            "GA4 report completed"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_run_report_parses_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/properties/123:runReport"))
            .and(body_string_contains("dateRanges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rows": [
                    {
                        "dimensionValues": [{"value": "20260715"}],
                        "metricValues": [{"value": "42"}, {"value": "0.63"}]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = Ga4DataClient::new().with_base_url(server.uri());
        let req = Ga4ReportRequest::new("2026-07-01", "2026-07-31", &["date"], &["activeUsers"]);
        let report = client.run_report("at-1", "properties/123", &req).await.unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].dimension(0), "20260715");
        assert_eq!(report.rows[0].metric_i64(0), 42);
        assert_eq!(report.rows[0].metric_f64(1), 0.63);
    }

    #[tokio::test]
    async fn test_row_accessors_tolerate_missing_cells() {
        let row = Ga4ReportRow {
            dimension_values: vec![],
            metric_values: vec![],
        };
        assert_eq!(row.dimension(0), "");
        assert_eq!(row.metric_i64(3), 0);
        assert_eq!(row.metric_f64(3), 0.0);
    }

    #[tokio::test]
    async fn test_permission_denied_preserved_in_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"status": "PERMISSION_DENIED", "message": "no access"}
            })))
            .mount(&server)
            .await;

        let client = Ga4DataClient::new().with_base_url(server.uri());
        let req = Ga4ReportRequest::new("2026-07-01", "2026-07-31", &["date"], &["activeUsers"]);
        let err = client
            .run_report("at-1", "properties/123", &req)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }
}
