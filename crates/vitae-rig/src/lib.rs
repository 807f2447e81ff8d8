#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod chat;
mod error;
pub mod provider;
pub mod rag;

pub use error::{Error, Result};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "vitae_rig";

/// Tracing target for the chat engine.
pub const TRACING_TARGET_ENGINE: &str = "vitae_rig::engine";

/// Tracing target for conversation memory.
pub const TRACING_TARGET_MEMORY: &str = "vitae_rig::memory";

/// Tracing target for index loading and retrieval.
pub const TRACING_TARGET_RETRIEVAL: &str = "vitae_rig::retrieval";

/// Tracing target for model providers.
pub const TRACING_TARGET_PROVIDER: &str = "vitae_rig::provider";
