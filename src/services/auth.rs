//! Dashboard token authentication
//!
//! The core consumes opaque bearer credentials issued by an external auth
//! collaborator. Expired, missing or malformed tokens are all rejected as
//! the same `Unauthenticated` error, never distinguished.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::errors::{RemindrError, Result};

/// Token claims as issued by the auth collaborator
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    email: String,
    exp: i64,
}

/// An authenticated dashboard session
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Token verification service
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Verify an `Authorization` header value and resolve the session.
    ///
    /// Every failure path collapses to `Unauthenticated`.
    pub fn verify_bearer(&self, authorization: Option<&str>) -> Result<Session> {
        let header = authorization.ok_or(RemindrError::Unauthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(RemindrError::Unauthenticated)?;

        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                debug!(error = %e, "Token verification failed");
                RemindrError::Unauthenticated
            })?;

        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or(RemindrError::Unauthenticated)?;

        Ok(Session {
            user_id: data.claims.sub,
            email: data.claims.email,
            expires_at,
        })
    }

    /// Issue a token for a user. The production issuer lives in the auth
    /// collaborator; this exists for test fixtures and local tooling.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        email: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| RemindrError::Config(format!("Failed to sign token: {}", e)))
    }
}
