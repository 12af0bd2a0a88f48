//! Typed server configuration loaded from environment variables.

use std::net::SocketAddr;

use pagelift_core::{Error, Result};

/// Server configuration.
///
/// Integration credentials (Google, LinkedIn, WordPress) are read by their
/// client `from_env` constructors; this struct carries only what the HTTP
/// layer itself needs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Origin allowed on the admin CORS policy (the dashboard SPA).
    pub cors_origin: String,
    /// Public base URL used for published page links.
    pub public_url: String,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Directory uploads are written to.
    pub upload_dir: String,
}

impl ApiConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required; everything else has a
    /// development default.
    pub fn from_env() -> Result<Self> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5001);

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".to_string()))?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| Error::Config("JWT_SECRET is not set".to_string()))?;
        if jwt_secret.len() < 16 {
            return Err(Error::Config(
                "JWT_SECRET must be at least 16 characters".to_string(),
            ));
        }

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let upload_dir =
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".to_string());

        Ok(Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            database_url,
            cors_origin,
            public_url,
            jwt_secret,
            upload_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_jwt_secret_rejected() {
        // Construct directly; from_env depends on process env shared across
        // tests, so only the validation branch is exercised here.
        let err = validate_secret("short");
        assert!(err.is_err());
        assert!(validate_secret("a-sufficiently-long-secret").is_ok());
    }

    fn validate_secret(secret: &str) -> Result<()> {
        if secret.len() < 16 {
            return Err(Error::Config(
                "JWT_SECRET must be at least 16 characters".to_string(),
            ));
        }
        Ok(())
    }
}
