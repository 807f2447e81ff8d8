//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g. `RUST_LOG=vitae_server::chat=debug`.

/// Bearer token extraction and verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "vitae_server::authentication";

/// Verification key loading at startup.
pub const TRACING_TARGET_VERIFIER: &str = "vitae_server::verifier";

/// Chat requests and answer streaming.
pub const TRACING_TARGET_CHAT: &str = "vitae_server::chat";

/// Request body parsing and rejections.
pub const TRACING_TARGET_EXTRACT: &str = "vitae_server::extract";

/// Error recovery including middleware errors and request failures.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "vitae_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "vitae_server::recovery::panic";

/// Error responses returned to clients.
pub const TRACING_TARGET_RESPONSE: &str = "vitae_server::response";
