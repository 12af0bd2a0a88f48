//! WordPress REST publishing client.
//!
//! Uses the built-in WordPress REST API with Application Password
//! authentication (WordPress 5.6+), so no plugin is required on the site.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use pagelift_core::defaults::INTEGRATION_TIMEOUT_SECS;
use pagelift_core::{Error, LandingPage, Result};

/// WordPress site configuration.
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub site_url: String,
    pub username: String,
    pub app_password: String,
}

impl WordPressConfig {
    /// Read configuration from `WP_SITE_URL`, `WP_USERNAME`, and
    /// `WP_APP_PASSWORD`. Returns None when cross-publishing is not
    /// configured.
    pub fn from_env() -> Option<Self> {
        let site_url = std::env::var("WP_SITE_URL").ok()?;
        let username = std::env::var("WP_USERNAME").ok()?;
        let app_password = std::env::var("WP_APP_PASSWORD").ok()?;
        Some(Self {
            site_url,
            username,
            app_password,
        })
    }
}

/// A post as returned by the WordPress REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct WordPressPost {
    pub id: i64,
    pub link: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// WordPress REST client.
pub struct WordPressClient {
    client: Client,
    config: WordPressConfig,
}

impl WordPressClient {
    /// Create a client for the configured site.
    pub fn new(config: WordPressConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(INTEGRATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            subsystem = "connect",
            component = "wordpress",
            op = "init",
            site_url = %config.site_url,
            "Initializing WordPress client"
        );

        Self { client, config }
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/wp-json/wp/v2{}",
            self.config.site_url.trim_end_matches('/'),
            path
        )
    }

    fn auth_header(&self) -> String {
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.username, self.config.app_password
        ));
        format!("Basic {}", credentials)
    }

    /// Verify the site is reachable and the application password works.
    pub async fn test_connection(&self) -> Result<()> {
        let response = self
            .client
            .get(self.api_url("/users/me"))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(()),
            401 => Err(Error::Integration(
                "WordPress authentication failed. Check WP_USERNAME and WP_APP_PASSWORD."
                    .to_string(),
            )),
            status => Err(Error::Integration(format!(
                "WordPress connection check failed: {}",
                status
            ))),
        }
    }

    /// Publish a landing page as a WordPress post and return its id and
    /// public link.
    pub async fn publish_page(&self, page: &LandingPage) -> Result<WordPressPost> {
        let body = serde_json::json!({
            "title": page.title,
            "content": pagelift_core::page_html::render_landing_page_body(page),
            "status": "publish",
            "slug": page.slug,
        });

        let response = self
            .client
            .post(self.api_url("/posts"))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "WordPress publish failed ({}): {}",
                status, text
            )));
        }

        let post: WordPressPost = response.json().await?;
        debug!(
            subsystem = "connect",
            component = "wordpress",
            op = "publish_page",
            page_id = %page.id,
            wp_post_id = post.id,
            "Published landing page to WordPress"
        );
        Ok(post)
    }

    /// Update an existing WordPress post from a landing page.
    pub async fn update_post(&self, post_id: i64, page: &LandingPage) -> Result<WordPressPost> {
        let body = serde_json::json!({
            "title": page.title,
            "content": pagelift_core::page_html::render_landing_page_body(page),
            "slug": page.slug,
        });

        let response = self
            .client
            .post(self.api_url(&format!("/posts/{}", post_id)))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "WordPress update failed ({}): {}",
                status, text
            )));
        }

        Ok(response.json().await?)
    }

    /// Delete a WordPress post.
    pub async fn delete_post(&self, post_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.api_url(&format!("/posts/{}", post_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "WordPress delete failed ({}): {}",
                status, text
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pagelift_core::{FormFields, PublishStatus};
    use uuid::Uuid;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WordPressConfig {
        WordPressConfig {
            site_url: server.uri(),
            username: "editor".to_string(),
            app_password: "abcd efgh".to_string(),
        }
    }

    fn sample_page() -> LandingPage {
        LandingPage {
            id: Uuid::nil(),
            title: "Launch".to_string(),
            slug: "launch".to_string(),
            headline: None,
            subheading: None,
            body_text: Some("Hello.".to_string()),
            cta_text: "Go".to_string(),
            hero_image_url: None,
            form_fields: FormFields::default_lead_form(),
            publish_status: PublishStatus::Draft,
            published_url: None,
            published_at: None,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 77,
                "link": "https://blog.example.com/launch/",
                "status": "publish"
            })))
            .mount(&server)
            .await;

        let client = WordPressClient::new(config_for(&server));
        let post = client.publish_page(&sample_page()).await.unwrap();
        assert_eq!(post.id, 77);
        assert_eq!(post.link, "https://blog.example.com/launch/");
    }

    #[tokio::test]
    async fn test_connection_check_maps_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = WordPressClient::new(config_for(&server));
        let err = client.test_connection().await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
    }
}
