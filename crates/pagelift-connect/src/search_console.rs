//! Google Search Console client: site listing and search-analytics queries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use pagelift_core::defaults::{INTEGRATION_TIMEOUT_SECS, SYNC_ROW_LIMIT};
use pagelift_core::{Error, Result};

/// Default Search Console API base.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/webmasters/v3";

/// A site entry from the sites listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConsoleSite {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SitesResponse {
    #[serde(default)]
    site_entry: Vec<SearchConsoleSite>,
}

/// Search analytics query request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub row_limit: i64,
    pub start_row: i64,
}

impl SearchAnalyticsQuery {
    /// The sync query: keyword + page dimensions over a date range.
    pub fn keyword_page(start_date: &str, end_date: &str) -> Self {
        Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            dimensions: vec!["query".to_string(), "page".to_string()],
            row_limit: SYNC_ROW_LIMIT,
            start_row: 0,
        }
    }
}

/// One row of a search analytics response. `keys` line up with the request
/// dimensions (query first, then page).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchAnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchAnalyticsResponse {
    #[serde(default)]
    rows: Vec<SearchAnalyticsRow>,
}

/// Search Console REST client.
pub struct SearchConsoleClient {
    client: Client,
    base_url: String,
}

impl Default for SearchConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConsoleClient {
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

    /// List the sites the connected account can read.
    pub async fn list_sites(&self, access_token: &str) -> Result<Vec<SearchConsoleSite>> {
        let response = self
            .client
            .get(format!("{}/sites", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "Search Console sites listing failed ({}): {}",
                status, body
            )));
        }

        let sites: SitesResponse = response.json().await?;
        Ok(sites.site_entry)
    }

    /// Run a search analytics query for a site.
    pub async fn query(
        &self,
        access_token: &str,
        site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> Result<Vec<SearchAnalyticsRow>> {
        let url = format!(
            "{}/sites/{}/searchAnalytics/query",
            self.base_url,
            urlencoding::encode(site_url)
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "Search Console query failed ({}): {}",
                status, body
            )));
        }

        let parsed: SearchAnalyticsResponse = response.json().await?;
        debug!(
            subsystem = "connect",
            component = "search_console",
            op = "query",
            site_url = %site_url,
            rows_fetched = parsed.rows.len(),
            "Search analytics query completed"
        );
        Ok(parsed.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_sites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites"))
            .and(header("authorization", "Bearer at-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "siteEntry": [
                    {"siteUrl": "https://example.com/", "permissionLevel": "siteOwner"}
                ]
            })))
            .mount(&server)
            .await;

        let client = SearchConsoleClient::new().with_base_url(server.uri());
        let sites = client.list_sites("at-1").await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].site_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_list_sites_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = SearchConsoleClient::new().with_base_url(server.uri());
        let sites = client.list_sites("at-1").await.unwrap();
        assert!(sites.is_empty());
    }

    #[tokio::test]
    async fn test_query_rows_and_encoding() {
        let server = MockServer::start().await;
        let query = SearchAnalyticsQuery::keyword_page("2026-07-01", "2026-07-31");
        Mock::given(method("POST"))
            .and(path(
                "/sites/https%3A%2F%2Fexample.com%2F/searchAnalytics/query",
            ))
            .and(body_json_string(
                serde_json::to_string(&query).unwrap(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rows": [
                    {
                        "keys": ["rust crm", "https://example.com/spring-sale"],
                        "clicks": 12.0,
                        "impressions": 340.0,
                        "ctr": 0.0353,
                        "position": 7.4
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = SearchConsoleClient::new().with_base_url(server.uri());
        let rows = client
            .query("at-1", "https://example.com/", &query)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keys[0], "rust crm");
        assert_eq!(rows[0].clicks, 12.0);
        assert_eq!(rows[0].position, Some(7.4));
    }

    #[tokio::test]
    async fn test_query_failure_is_integration_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let client = SearchConsoleClient::new().with_base_url(server.uri());
        let err = client
            .query(
                "at-1",
                "https://example.com/",
                &SearchAnalyticsQuery::keyword_page("2026-07-01", "2026-07-31"),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }
}
