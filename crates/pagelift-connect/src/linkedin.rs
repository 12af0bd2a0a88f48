//! LinkedIn client: OAuth 2.0 flow, OpenID userinfo, and UGC post
//! publishing.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use pagelift_core::defaults::INTEGRATION_TIMEOUT_SECS;
use pagelift_core::{Error, LinkedInProfile, Result};

/// Default authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";

/// Default REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.linkedin.com/v2";

/// Scopes requested during the connect flow: OpenID identity plus member
/// post publishing.
pub const LINKEDIN_SCOPES: &str = "openid profile email w_member_social";

/// OAuth application configuration.
#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl LinkedInConfig {
    /// Read configuration from `LINKEDIN_CLIENT_ID`, `LINKEDIN_CLIENT_SECRET`,
    /// and `LINKEDIN_REDIRECT_URI`. Returns None when not configured.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("LINKEDIN_CLIENT_ID").ok()?;
        let client_secret = std::env::var("LINKEDIN_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("LINKEDIN_REDIRECT_URI").ok()?;
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub struct LinkedInTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UgcPostResponse {
    id: String,
}

/// Identifiers of a post created through the UGC API.
#[derive(Debug, Clone)]
pub struct PublishedUgcPost {
    pub id: String,
    pub urn: String,
}

/// LinkedIn REST client.
pub struct LinkedInClient {
    client: Client,
    config: LinkedInConfig,
    auth_url: String,
    token_url: String,
    api_base: String,
}

impl LinkedInClient {
    /// Create a client against the production endpoints.
    pub fn new(config: LinkedInConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(INTEGRATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            config,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the token endpoint (tests).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the API base (tests).
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Build the authorization URL with a CSRF state token.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}&scope={}",
            self.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(LINKEDIN_SCOPES),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<LinkedInTokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "LinkedIn token exchange failed ({}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch the connected member's identity via the OpenID userinfo
    /// endpoint.
    pub async fn user_profile(&self, access_token: &str) -> Result<LinkedInProfile> {
        let response = self
            .client
            .get(format!("{}/userinfo", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "LinkedIn userinfo failed ({}): {}",
                status, body
            )));
        }

        let info: UserInfoResponse = response.json().await?;
        let name = info.name.or_else(|| {
            let combined = format!(
                "{} {}",
                info.given_name.as_deref().unwrap_or(""),
                info.family_name.as_deref().unwrap_or("")
            );
            let trimmed = combined.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(LinkedInProfile {
            linkedin_user_id: info.sub,
            name,
            email: info.email,
        })
    }

    /// Publish a text-only UGC post as the member.
    ///
    /// Image URLs are not forwarded: LinkedIn only accepts media uploaded to
    /// its own CDN, so an `image_url` is recorded locally and skipped here.
    pub async fn publish_post(
        &self,
        access_token: &str,
        linkedin_user_id: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<PublishedUgcPost> {
        if image_url.is_some() {
            warn!(
                subsystem = "connect",
                component = "linkedin",
                op = "publish_post",
                "Image URLs are not uploaded to LinkedIn; publishing text only"
            );
        }

        let author_urn = format!("urn:li:person:{}", linkedin_user_id);
        let body = serde_json::json!({
            "author": author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        });

        let response = self
            .client
            .post(format!("{}/ugcPosts", self.api_base))
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Integration(format!(
                "LinkedIn post publish failed ({}): {}",
                status, body
            )));
        }

        let urn_header = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let post: UgcPostResponse = response.json().await?;
        let urn = urn_header.unwrap_or_else(|| post.id.clone());

        debug!(
            subsystem = "connect",
            component = "linkedin",
            op = "publish_post",
            urn = %urn,
            "Published UGC post"
        );

        Ok(PublishedUgcPost { id: post.id, urn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> LinkedInConfig {
        LinkedInConfig {
            client_id: "li-client".to_string(),
            client_secret: "li-secret".to_string(),
            redirect_uri: "http://localhost:5001/api/admin/linkedin/oauth/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url() {
        let client = LinkedInClient::new(test_config());
        let url = client.authorization_url("state-1");
        assert!(url.starts_with(DEFAULT_AUTH_URL));
        assert!(url.contains("client_id=li-client"));
        assert!(url.contains("state=state-1"));
        assert!(url.contains("w_member_social"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "li-at",
                "expires_in": 5184000,
                "scope": "openid profile"
            })))
            .mount(&server)
            .await;

        let client = LinkedInClient::new(test_config())
            .with_token_url(format!("{}/token", server.uri()));
        let tokens = client.exchange_code("code-1").await.unwrap();
        assert_eq!(tokens.access_token, "li-at");
        assert_eq!(tokens.expires_in, 5184000);
    }

    #[tokio::test]
    async fn test_user_profile_assembles_name_from_parts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "abc123",
                "given_name": "Ada",
                "family_name": "Lovelace",
                "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let client =
            LinkedInClient::new(test_config()).with_api_base(server.uri());
        let profile = client.user_profile("li-at").await.unwrap();
        assert_eq!(profile.linkedin_user_id, "abc123");
        assert_eq!(profile.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_publish_post_prefers_restli_header_urn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ugcPosts"))
            .and(header("x-restli-protocol-version", "2.0.0"))
            .and(body_string_contains("urn:li:person:abc123"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-restli-id", "urn:li:share:42")
                    .set_body_json(serde_json::json!({"id": "post-42"})),
            )
            .mount(&server)
            .await;

        let client =
            LinkedInClient::new(test_config()).with_api_base(server.uri());
        let post = client
            .publish_post("li-at", "abc123", "Hello network", None)
            .await
            .unwrap();
        assert_eq!(post.id, "post-42");
        assert_eq!(post.urn, "urn:li:share:42");
    }
}
