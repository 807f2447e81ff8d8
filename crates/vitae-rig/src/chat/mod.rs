//! Context-augmented chat.
//!
//! This module provides:
//! - [`ChatService`] - Shared factory creating one engine per request
//! - [`ChatEngine`] - Streams an answer to a question given its history
//! - [`ChatMemoryBuffer`] - Token-bounded conversation window
//! - [`PromptBuilder`] - Persona prompt and retrieved context rendering

mod engine;
mod memory;
mod message;
mod prompt;
mod service;

use futures::stream::BoxStream;

pub use self::engine::{ChatEngine, ContextChatEngine};
pub use self::memory::{ChatMemoryBuffer, DEFAULT_TOKEN_LIMIT, estimate_tokens};
pub use self::message::{ChatMessage, Role};
pub use self::prompt::{DEFAULT_SYSTEM_PROMPT, PromptBuilder};
pub use self::service::{
    ChatService, ChatSettings, ChatSettingsBuilder, ChatSettingsBuilderError, DEFAULT_INDEX_NAME,
};

/// Answer text, delivered fragment by fragment as the model produces it.
pub type FragmentStream = BoxStream<'static, crate::Result<String>>;
