//! Authentication and authorization utilities
//!
//! Provides:
//! - Argon2 password hashing and verification
//! - Session token generation and validation
//! - Typed session-to-identity resolution
//! - Opaque liker identifiers for the like endpoint

use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The authenticated principal behind a request.
///
/// Resolved at most once per request at the authentication boundary;
/// handlers receive it (or its absence) as a typed value, never through
/// a loader callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID
    pub user_id: i64,

    /// Account email
    pub email: String,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Account email
    pub email: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Session token manager
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl SessionManager {
    /// Create a new session manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Issue a session token for a user
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to issue session token: {}", e),
        })
    }

    /// Validate and decode a session token
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::Unauthorized {
                    message: "Invalid session token".to_string(),
                },
            })
    }

    /// Resolve an optional bearer token to an identity.
    ///
    /// No token resolves to `None`; a present-but-invalid token is an
    /// error rather than anonymous access.
    pub fn resolve(&self, bearer: Option<&str>) -> Result<Option<Identity>> {
        let Some(token) = bearer else {
            return Ok(None);
        };

        let claims = self.validate_token(token)?;

        let user_id = claims.sub.parse::<i64>().map_err(|_| AppError::Unauthorized {
            message: "Malformed session subject".to_string(),
        })?;

        Ok(Some(Identity {
            user_id,
            email: claims.email,
        }))
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("Password hashing failed: {}", e),
        })
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate a session-signing secret when none is configured
pub fn generate_session_secret() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Opaque liker identifier: hashed client address + user agent
pub fn liker_hash(client_addr: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_addr.as_bytes());
    hasher.update(b"\x00");
    hasher.update(user_agent.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_session_roundtrip() {
        let manager = SessionManager::new("test_secret", 3600);

        let token = manager.issue_token(42, "owner@example.com").unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "owner@example.com");
    }

    #[test]
    fn test_resolve_absent_token_is_anonymous() {
        let manager = SessionManager::new("test_secret", 3600);
        assert_eq!(manager.resolve(None).unwrap(), None);
    }

    #[test]
    fn test_resolve_valid_token() {
        let manager = SessionManager::new("test_secret", 3600);
        let token = manager.issue_token(7, "alice@example.com").unwrap();

        let identity = manager.resolve(Some(&token)).unwrap().unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn test_resolve_invalid_token_errors() {
        let manager = SessionManager::new("test_secret", 3600);
        assert!(manager.resolve(Some("not-a-token")).is_err());
    }

    #[test]
    fn test_liker_hash_is_stable_and_distinct() {
        let a = liker_hash("203.0.113.7", "Mozilla/5.0");
        let b = liker_hash("203.0.113.7", "Mozilla/5.0");
        let c = liker_hash("203.0.113.8", "Mozilla/5.0");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer("abc123"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_generated_secret_shape() {
        let secret = generate_session_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, generate_session_secret());
    }
}
