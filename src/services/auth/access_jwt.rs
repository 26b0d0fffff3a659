//! Bearer credential verification.
//!
//! `TokenAuthenticator::authenticate` is the single decision point of the request
//! authorization pipeline:
//! - no token         → `AuthError::TokenNotFound`
//! - token, invalid   → `AuthError::InvalidToken`
//! - token, valid     → `Identity`
//!
//! The axum adapter that inserts the identity into request extensions lives in
//! `middleware::auth::access`.
use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded payload of a verified credential.
///
/// This is also the claim set signed by `JwtIssuer`, so a token round-trips to
/// the same value. Claims other than `email`/`iat`/`exp` are kept in `extra`
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    // 0 when the token carries no `iat`
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    pub fn new(email: impl Into<String>, issued_at: i64, ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            email: email.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token not found")]
    TokenNotFound,
    #[error("{0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// HS256 access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenAuthenticator {
    pub fn new(secret: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Extract the credential from `headers` and verify it.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::TokenNotFound)?;
        self.verify(token)
    }

    // Signature + exp check only; extraction is done by the caller.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = jsonwebtoken::decode::<Identity>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// `Authorization: Bearer <credential>` → `<credential>`.
///
/// Any other scheme, a non-UTF-8 value or an empty credential is treated as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
