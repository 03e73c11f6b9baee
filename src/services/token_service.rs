//! Bearer token issuing and verification (HS256 JWT).
//!
//! Tokens carry identity, roles, and display name; verification checks
//! signature, expiry, and issuer. Failures are terminal for the request:
//! there is no refresh or retry path here.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::domain::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("failed to issue token: {0}")]
    Issue(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Normalized username of the authenticated account.
    pub sub: String,
    /// Display name, informational only.
    pub name: String,
    pub roles: Vec<Role>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_seconds: u64,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl_seconds: config.token_ttl_seconds,
        }
    }

    pub fn issue(
        &self,
        username: &str,
        nickname: &str,
        roles: &[Role],
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            name: nickname.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}
