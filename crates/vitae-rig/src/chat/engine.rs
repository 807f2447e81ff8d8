//! Retrieval-augmented chat engine.

use std::sync::Arc;

use super::memory::{ChatMemoryBuffer, estimate_tokens};
use super::message::ChatMessage;
use super::prompt::PromptBuilder;
use super::FragmentStream;
use crate::provider::LanguageModel;
use crate::rag::Retriever;
use crate::{Result, TRACING_TARGET_ENGINE};

/// A conversational engine answering one question at a time.
#[async_trait::async_trait]
pub trait ChatEngine: Send {
    /// Answers `query` given the prior conversation `history`.
    ///
    /// Fails before producing anything if context retrieval or the model
    /// call cannot be started.
    async fn stream_chat(&mut self, query: &str, history: Vec<ChatMessage>)
    -> Result<FragmentStream>;
}

/// Chat engine that grounds each answer in retrieved context.
///
/// For every question the engine retrieves context nodes, renders them into
/// the system message after the persona prompt, and sends the system message
/// followed by as much recent conversation as fits in the memory budget.
pub struct ContextChatEngine {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LanguageModel>,
    memory: ChatMemoryBuffer,
    prompt: PromptBuilder,
}

impl ContextChatEngine {
    /// Creates an engine with the default persona prompt and memory.
    pub fn new(retriever: Arc<dyn Retriever>, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            retriever,
            llm,
            memory: ChatMemoryBuffer::default(),
            prompt: PromptBuilder::new(),
        }
    }

    /// Replaces the conversation memory.
    pub fn with_memory(mut self, memory: ChatMemoryBuffer) -> Self {
        self.memory = memory;
        self
    }

    /// Replaces the persona prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = self.prompt.with_system_prompt(prompt);
        self
    }

    /// Returns the conversation memory.
    pub fn memory(&self) -> &ChatMemoryBuffer {
        &self.memory
    }
}

#[async_trait::async_trait]
impl ChatEngine for ContextChatEngine {
    async fn stream_chat(
        &mut self,
        query: &str,
        history: Vec<ChatMessage>,
    ) -> Result<FragmentStream> {
        self.memory.set(history);
        self.memory.put(ChatMessage::user(query));

        let nodes = self.retriever.retrieve(query).await?;
        let context_nodes = nodes.len();

        let system = self.prompt.clone().with_context(nodes).build_system_prompt();
        let window = self.memory.get(estimate_tokens(&system));

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            model = self.llm.model_name(),
            context_nodes,
            history = self.memory.all().len(),
            window = window.len(),
            "Starting context chat"
        );

        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(window);

        self.llm.stream_chat(messages).await
    }
}

impl std::fmt::Debug for ContextChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextChatEngine")
            .field("model", &self.llm.model_name())
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}
