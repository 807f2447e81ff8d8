//! HTTP request extractors with client-friendly rejections.
//!
//! ## Authentication
//!
//! - [`BearerToken`] - Token presented with the `Bearer` scheme
//! - [`AuthState`] - Verified claims of that token
//!
//! ## Request Data Extraction
//!
//! - [`LenientJson`] - JSON body accepted under any `Content-Type`

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthState, BearerToken};
pub use crate::extract::reject::LenientJson;
