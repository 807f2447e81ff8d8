//! JWT verification with a shared secret or an Ed25519 public key.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use super::verifier::{AuthClaims, TokenVerifier, VerifyError};
use crate::utility::tracing_targets::TRACING_TARGET_VERIFIER;
use crate::{Error, Result};

/// Claims every token must carry.
const REQUIRED_CLAIMS: &[&str] = &["sub", "exp"];

/// Verifies signed JWTs.
///
/// Signature and expiration are always checked. Issuer and audience are
/// checked only when configured.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    fn new(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(REQUIRED_CLAIMS);

        Self {
            decoding_key,
            validation,
        }
    }

    /// Creates a verifier for HS256 tokens signed with `secret`.
    pub fn hs256(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(Error::config("JWT secret key cannot be empty"));
        }

        Ok(Self::new(DecodingKey::from_secret(secret), Algorithm::HS256))
    }

    /// Creates a verifier for EdDSA tokens from a PEM encoded public key.
    pub fn ed25519_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let decoding_key = DecodingKey::from_ed_pem(pem.as_ref())?;
        Ok(Self::new(decoding_key, Algorithm::EdDSA))
    }

    /// Reads an Ed25519 public key from a PEM file.
    pub async fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        tracing::debug!(
            target: TRACING_TARGET_VERIFIER,
            path = %path.display(),
            "Loading JWT public key"
        );

        let pem = tokio::fs::read(path).await.map_err(|e| {
            Error::file_system(format!("failed to read public key: {}", path.display()))
                .with_source(e)
        })?;

        let verifier = Self::ed25519_pem(pem)?;

        tracing::info!(
            target: TRACING_TARGET_VERIFIER,
            path = %path.display(),
            "JWT public key loaded"
        );

        Ok(verifier)
    }

    /// Requires the `iss` claim to match `issuer`.
    pub fn with_issuer(mut self, issuer: impl ToString) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Requires the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: impl ToString) -> Self {
        self.validation.validate_aud = true;
        self.validation.set_audience(&[audience]);
        self
    }

    /// Returns the accepted signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.validation.algorithms[0]
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError> {
        if token.is_empty() {
            return Err(VerifyError::EmptyToken);
        }

        let token_data = decode::<AuthClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithm", &self.algorithm())
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}
