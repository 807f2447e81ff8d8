//! Language model and embedding providers.
//!
//! The chat engine only talks to the [`LanguageModel`] and [`TextEmbedder`]
//! traits. [`CompletionProvider`] and [`EmbeddingProvider`] implement them on
//! top of rig for OpenAI and Ollama; tests substitute their own mocks.

mod completion;
mod config;
mod embedding;

pub use completion::CompletionProvider;
pub use config::{LlmProvider, RigConfig};
pub use embedding::EmbeddingProvider;

use crate::Result;
use crate::chat::{ChatMessage, FragmentStream};

/// A chat model producing its answer as a stream of text fragments.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model name, for logging.
    fn model_name(&self) -> &str;

    /// Opens a streamed completion for the given conversation.
    ///
    /// Errors returned here happen before any fragment is produced. Errors
    /// inside the stream happen mid-answer.
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream>;
}

/// Maps text to an embedding vector.
#[async_trait::async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}
