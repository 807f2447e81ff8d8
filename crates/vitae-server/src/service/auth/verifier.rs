use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims of a verified bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Identity the token was issued to.
    pub sub: String,
    /// Expiration time, seconds since the epoch.
    pub exp: u64,
    /// Issue time, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Every other claim, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Reasons a token is refused.
///
/// Never returned to clients; the handler answers every variant with the
/// same 401 response.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The bearer header carried no token.
    #[error("empty token")]
    EmptyToken,
    /// The token is malformed, expired, or badly signed.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    /// The token was valid but the verifier refused it.
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Verifies bearer tokens presented to the server.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies the token and returns its claims.
    async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError>;
}

/// Shared [`TokenVerifier`] stored in the service state.
#[derive(Clone)]
pub struct AuthVerifier {
    inner: Arc<dyn TokenVerifier>,
}

impl AuthVerifier {
    /// Wraps a verifier.
    pub fn new(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            inner: Arc::new(verifier),
        }
    }

    /// Verifies the token with the wrapped verifier.
    #[inline]
    pub async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError> {
        self.inner.verify(token).await
    }
}

impl From<Arc<dyn TokenVerifier>> for AuthVerifier {
    fn from(inner: Arc<dyn TokenVerifier>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for AuthVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_claims_are_kept() -> anyhow::Result<()> {
        let claims: AuthClaims =
            serde_json::from_str(r#"{"sub":"alice","exp":10,"scope":"chat","iat":1}"#)?;
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, Some(1));
        assert_eq!(claims.extra.get("scope"), Some(&Value::from("chat")));
        Ok(())
    }

    #[test]
    fn missing_subject_is_rejected() {
        assert!(serde_json::from_str::<AuthClaims>(r#"{"exp":10}"#).is_err());
    }
}
