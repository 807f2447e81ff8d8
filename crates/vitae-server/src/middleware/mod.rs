//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Recovery (timeouts, panics, service errors)
//! - Observability (tracing, request IDs)
//! - Security (CORS, headers, body limits)
//!
//! ```rust,no_run
//! use axum::Router;
//! use vitae_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, DEFAULT_MAX_BODY_SIZE, RouterSecurityExt, SecurityHeadersConfig};
