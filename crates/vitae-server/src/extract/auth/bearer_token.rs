//! Bearer token extraction from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use crate::handler::{Error, ErrorKind, Result};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Scheme every accepted `Authorization` header starts with.
const BEARER_SCHEME: &str = "Bearer";

/// Unverified token presented in the `Authorization` header.
///
/// The header must start with `Bearer`; the token is its second
/// whitespace-separated word, and is empty when that word is missing.
/// Verification is left to [`AuthState`].
///
/// [`AuthState`]: crate::extract::AuthState
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Parses an `Authorization` header value.
    ///
    /// Returns `None` unless the value starts with `Bearer`.
    pub fn parse(header: &str) -> Option<Self> {
        if !header.starts_with(BEARER_SCHEME) {
            return None;
        }

        let token = header.split_whitespace().nth(1).unwrap_or_default();
        Some(Self(token.to_owned()))
    }

    /// Returns the raw token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short SHA-256 fingerprint safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..6])
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken")
            .field(&self.fingerprint())
            .finish()
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Return cached token if available to avoid re-parsing
        if let Some(token) = parts.extensions.get::<Self>() {
            return Ok(token.clone());
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let Some(token) = header.and_then(Self::parse) else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                has_header = parts.headers.contains_key(AUTHORIZATION),
                "Missing or unsupported authorization header"
            );

            return Err(ErrorKind::MissingAuthToken
                .with_context("Authorization header must use the Bearer scheme"));
        };

        tracing::info!(
            target: TRACING_TARGET_AUTHENTICATION,
            token = %token.fingerprint(),
            "Received bearer token"
        );

        parts.extensions.insert(token.clone());
        Ok(token)
    }
}
