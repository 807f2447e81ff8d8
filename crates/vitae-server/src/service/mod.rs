//! Application state and dependency injection.

mod auth;
mod config;
mod state;

pub use crate::service::auth::{AuthClaims, AuthVerifier, JwtVerifier, TokenVerifier, VerifyError};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, ServiceConfigBuilderError};
pub use crate::service::state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

#[cfg(test)]
pub(crate) use crate::service::auth::{TEST_SECRET, hs256_token};
