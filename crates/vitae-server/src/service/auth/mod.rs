//! Bearer token verification.
//!
//! - [`TokenVerifier`] - Capability verifying a token into [`AuthClaims`]
//! - [`AuthVerifier`] - Shared handle injected into the router state
//! - [`JwtVerifier`] - Verifies HS256 or EdDSA signed JWTs

mod jwt;
mod verifier;

pub use self::jwt::JwtVerifier;
pub use self::verifier::{AuthClaims, AuthVerifier, TokenVerifier, VerifyError};

#[cfg(test)]
pub(crate) use self::jwt::tests::{TEST_SECRET, hs256_token};
