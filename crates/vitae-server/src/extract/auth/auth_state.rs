//! Verified authentication state extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;

use super::BearerToken;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AuthClaims, AuthVerifier};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Claims of a bearer token accepted by the configured [`AuthVerifier`].
///
/// Extraction reads the [`BearerToken`] first, so a request without a
/// usable `Authorization` header is rejected before verification runs.
/// Every verification failure yields the same 401 response; the cause is
/// only logged.
///
/// The verified state is cached in the request extensions.
#[derive(Debug, Clone, Deref, PartialEq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Returns the verified claims.
    #[inline]
    pub fn claims(&self) -> &AuthClaims {
        &self.0
    }

    /// Returns the identity the token was issued to.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    AuthVerifier: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let token = BearerToken::from_request_parts(parts, state).await?;
        let verifier = AuthVerifier::from_ref(state);

        let claims = verifier.verify(token.as_str()).await.map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token = %token.fingerprint(),
                error = %error,
                "Bearer token verification failed"
            );

            ErrorKind::Unauthorized.with_context(error.to_string())
        })?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = %claims.sub,
            expires_at = claims.exp,
            "Bearer token verified"
        );

        let auth_state = Self(claims);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}
