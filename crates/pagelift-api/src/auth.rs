//! JWT session tokens and the authenticated-user extractor.
//!
//! Sessions are HS256 JWTs with pinned issuer and audience claims, issued at
//! login and carried as `Authorization: Bearer <token>`. Passwords are
//! verified against argon2 hashes; the hash format travels inside the stored
//! string so parameter upgrades don't invalidate old rows.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pagelift_core::defaults::{JWT_AUDIENCE, JWT_ISSUER, JWT_TTL_SECS};
use pagelift_core::{Error, Result, UserCredentials, UserRole};

use crate::error::ApiError;
use crate::state::AppState;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a session token for a user who just authenticated.
pub fn issue_token(secret: &str, user: &UserCredentials) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iss: JWT_ISSUER.to_string(),
        aud: JWT_AUDIENCE.to_string(),
        iat: now,
        exp: now + JWT_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("token encoding failed: {}", e)))
}

/// Decode and validate a session token.
pub fn verify_token(secret: &str, token: &str) -> std::result::Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[JWT_ISSUER]);
    validation.set_audience(&[JWT_AUDIENCE]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::unauthorized(
            "TOKEN_EXPIRED",
            "Your session has expired. Please log in again.",
        ),
        _ => ApiError::unauthorized(
            "INVALID_TOKEN",
            "The provided token is invalid or malformed.",
        ),
    })
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// The authenticated principal, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Enforce a role allowlist. An empty list admits any authenticated
    /// user.
    pub fn require_role(&self, allowed: &[UserRole]) -> std::result::Result<(), ApiError> {
        if allowed.is_empty() || allowed.contains(&self.role) {
            return Ok(());
        }
        let roles = allowed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(ApiError::forbidden(format!(
            "Insufficient permissions. This action requires {} role.",
            roles
        )))
    }

    /// True when the principal may modify a resource owned by `owner`.
    /// Admins may modify anything; everyone else only their own resources.
    pub fn can_modify(&self, owner: Uuid) -> bool {
        self.role == UserRole::Admin || self.id == owner
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::unauthorized(
                    "NO_TOKEN",
                    "No authorization header provided. Please include Authorization header \
                     with Bearer token.",
                )
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthorized(
                "INVALID_TOKEN_FORMAT",
                "Authorization header must be in format: Bearer <token>",
            )
        })?;

        if token.is_empty() {
            return Err(ApiError::unauthorized(
                "NO_TOKEN",
                "No token provided in Authorization header.",
            ));
        }

        let claims = verify_token(&state.config.jwt_secret, token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserCredentials {
        UserCredentials {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Editor,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = sample_user();
        let token = issue_token("test-secret-test-secret", &user).unwrap();
        let claims = verify_token("test-secret-test-secret", &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Editor);
        assert_eq!(claims.iss, JWT_ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("test-secret-test-secret", &sample_user()).unwrap();
        let err = verify_token("another-secret-entirely", &token).unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = verify_token("test-secret-test-secret", "not.a.jwt").unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_against_malformed_hash() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }

    #[test]
    fn test_require_role() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "e@example.com".to_string(),
            role: UserRole::Viewer,
        };
        assert!(user.require_role(&[]).is_ok());
        assert!(user
            .require_role(&[UserRole::Admin, UserRole::Editor])
            .is_err());
        assert!(user.require_role(&[UserRole::Viewer]).is_ok());
    }

    #[test]
    fn test_can_modify_ownership_rule() {
        let owner = Uuid::new_v4();
        let admin = AuthUser {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            role: UserRole::Admin,
        };
        let editor = AuthUser {
            id: Uuid::new_v4(),
            email: "e@example.com".to_string(),
            role: UserRole::Editor,
        };
        assert!(admin.can_modify(owner));
        assert!(!editor.can_modify(owner));
        assert!(editor.can_modify(editor.id));
    }
}
