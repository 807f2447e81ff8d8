//! Authentication extractors.
//!
//! - [`BearerToken`] - Unverified token from the `Authorization` header
//! - [`AuthState`] - Claims of a token accepted by the configured verifier

mod auth_state;
mod bearer_token;

pub use self::auth_state::AuthState;
pub use self::bearer_token::BearerToken;
