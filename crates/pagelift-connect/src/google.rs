//! Google OAuth2 client: authorization URL construction, code exchange, and
//! refresh-token redemption.
//!
//! Tokens are stored by the caller; this client is stateless apart from its
//! configuration.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info};

use pagelift_core::defaults::INTEGRATION_TIMEOUT_SECS;
use pagelift_core::{Error, GoogleTokenSet, Result};

/// Default authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested during the connect flow: read-only Search Console and
/// Analytics access.
pub const GOOGLE_OAUTH_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/webmasters.readonly",
    "https://www.googleapis.com/auth/analytics.readonly",
];

/// OAuth application configuration.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleOAuthConfig {
    /// Read configuration from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`,
    /// and `GOOGLE_REDIRECT_URI`. Returns None when the integration is not
    /// configured.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").ok()?;
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

/// Token endpoint response for both code exchange and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

/// Google OAuth2 client.
pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleOAuthConfig,
    auth_url: String,
    token_url: String,
}

impl GoogleOAuthClient {
    /// Create a new client with the default Google endpoints.
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(INTEGRATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            subsystem = "connect",
            component = "google_oauth",
            op = "init",
            "Initializing Google OAuth client"
        );

        Self {
            client,
            config,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Override the token endpoint (tests).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Build the authorization URL for the connect flow.
    ///
    /// Offline access with a forced consent screen, so a refresh token is
    /// issued even for repeat connections. `state` round-trips the acting
    /// user id through the callback.
    pub fn authorization_url(&self, state: &str) -> String {
        let scope = GOOGLE_OAUTH_SCOPES.join(" ");
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline&prompt=consent&state={}",
            self.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokenSet> {
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
                "Google token exchange failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            subsystem = "connect",
            component = "google_oauth",
            op = "exchange_code",
            expires_in = token.expires_in,
            "Exchanged authorization code"
        );

        Ok(GoogleTokenSet {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expiry: Utc::now() + Duration::seconds(token.expires_in),
            scope: token
                .scope
                .unwrap_or_else(|| GOOGLE_OAUTH_SCOPES.join(" ")),
        })
    }

    /// Redeem a refresh token for a fresh access token.
    ///
    /// Google does not rotate the refresh token on this path; the returned
    /// set carries None so the caller keeps the stored one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<GoogleTokenSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
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
                "Google token refresh failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            subsystem = "connect",
            component = "google_oauth",
            op = "refresh",
            expires_in = token.expires_in,
            "Refreshed access token"
        );

        Ok(GoogleTokenSet {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expiry: Utc::now() + Duration::seconds(token.expires_in),
            scope: token
                .scope
                .unwrap_or_else(|| GOOGLE_OAUTH_SCOPES.join(" ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            redirect_uri: "http://localhost:5001/api/admin/google/oauth/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_carries_scopes_and_state() {
        let client = GoogleOAuthClient::new(test_config());
        let url = client.authorization_url("user-abc");

        assert!(url.starts_with(DEFAULT_AUTH_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=user-abc"));
        assert!(url.contains("webmasters.readonly"));
        assert!(url.contains("analytics.readonly"));
    }

    #[tokio::test]
    async fn test_exchange_code_parses_token_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-1",
                "refresh_token": "rt-1",
                "expires_in": 3600,
                "scope": "scope-a scope-b"
            })))
            .mount(&server)
            .await;

        let client = GoogleOAuthClient::new(test_config())
            .with_token_url(format!("{}/token", server.uri()));

        let tokens = client.exchange_code("auth-code").await.unwrap();
        assert_eq!(tokens.access_token, "at-1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt-1"));
        assert_eq!(tokens.scope, "scope-a scope-b");
        assert!(tokens.expiry > Utc::now());
    }

    #[tokio::test]
    async fn test_refresh_without_rotated_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-2",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let client = GoogleOAuthClient::new(test_config())
            .with_token_url(format!("{}/token", server.uri()));

        let tokens = client.refresh("rt-1").await.unwrap();
        assert_eq!(tokens.access_token, "at-2");
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_exchange_failure_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let client = GoogleOAuthClient::new(test_config())
            .with_token_url(format!("{}/token", server.uri()));

        let err = client.exchange_code("bad-code").await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
