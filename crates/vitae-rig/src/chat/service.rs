//! Shared factory for per-request chat engines.

use std::sync::Arc;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::engine::{ChatEngine, ContextChatEngine};
use super::memory::{ChatMemoryBuffer, DEFAULT_TOKEN_LIMIT};
use super::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::provider::LanguageModel;
use crate::rag::{DEFAULT_SIMILARITY_TOP_K, IndexProvider, VectorIndexRetriever};
use crate::{Result, TRACING_TARGET_ENGINE};

/// Default name of the index answering questions.
pub const DEFAULT_INDEX_NAME: &str = "resume";

/// Settings applied to every engine created by a [`ChatService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(
    name = "ChatSettingsBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ChatSettings {
    /// Name of the index to retrieve context from.
    #[builder(default = "DEFAULT_INDEX_NAME.to_owned()")]
    pub index_name: String,

    /// Number of context nodes retrieved per question.
    #[builder(default = "DEFAULT_SIMILARITY_TOP_K")]
    pub similarity_top_k: usize,

    /// Token budget of the conversation memory.
    #[builder(default = "DEFAULT_TOKEN_LIMIT")]
    pub memory_token_limit: usize,

    /// Persona prompt placed before the retrieved context.
    #[builder(default = "DEFAULT_SYSTEM_PROMPT.to_owned()")]
    pub system_prompt: String,
}

impl ChatSettings {
    /// Creates a new settings builder.
    pub fn builder() -> ChatSettingsBuilder {
        ChatSettingsBuilder::default()
    }
}

impl ChatSettingsBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(name) = &self.index_name
            && name.trim().is_empty()
        {
            return Err("index name cannot be empty".into());
        }

        if self.similarity_top_k == Some(0) {
            return Err("similarity top-k must be greater than 0".into());
        }

        if self.memory_token_limit == Some(0) {
            return Err("memory token limit must be greater than 0".into());
        }

        Ok(())
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_owned(),
            similarity_top_k: DEFAULT_SIMILARITY_TOP_K,
            memory_token_limit: DEFAULT_TOKEN_LIMIT,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }
}

/// Inner state for [`ChatService`].
struct ChatServiceInner {
    indexes: Arc<dyn IndexProvider>,
    llm: Arc<dyn LanguageModel>,
    settings: ChatSettings,
}

/// Creates a fresh [`ChatEngine`] for each conversation turn.
///
/// This type is cheap to clone and can be shared across threads. Nothing
/// it holds is mutated after construction; all per-conversation state lives
/// in the engines it hands out.
#[derive(Clone)]
pub struct ChatService {
    inner: Arc<ChatServiceInner>,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(
        indexes: Arc<dyn IndexProvider>,
        llm: Arc<dyn LanguageModel>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ChatServiceInner {
                indexes,
                llm,
                settings,
            }),
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &ChatSettings {
        &self.inner.settings
    }

    /// Returns true if the configured index is loaded.
    pub fn is_ready(&self) -> bool {
        self.inner
            .indexes
            .get_index(&self.inner.settings.index_name)
            .is_ok()
    }

    /// Creates an engine with an empty memory over the configured index.
    ///
    /// Fails if the configured index is not loaded.
    pub fn create_engine(&self) -> Result<Box<dyn ChatEngine>> {
        let settings = &self.inner.settings;
        let index = self.inner.indexes.get_index(&settings.index_name)?;

        let retriever =
            VectorIndexRetriever::new(index).with_similarity_top_k(settings.similarity_top_k);
        let engine = ContextChatEngine::new(Arc::new(retriever), self.inner.llm.clone())
            .with_memory(ChatMemoryBuffer::new(settings.memory_token_limit))
            .with_system_prompt(settings.system_prompt.clone());

        tracing::trace!(
            target: TRACING_TARGET_ENGINE,
            index = %settings.index_name,
            similarity_top_k = settings.similarity_top_k,
            memory_token_limit = settings.memory_token_limit,
            "Created chat engine"
        );

        Ok(Box::new(engine))
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("model", &self.inner.llm.model_name())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::Error;
    use crate::chat::ChatMessage;
    use crate::chat::engine::tests::ScriptedModel;
    use crate::rag::IndexStore;
    use crate::rag::resume_index;

    fn service(settings: ChatSettings) -> anyhow::Result<(ChatService, Arc<ScriptedModel>)> {
        let mut store = IndexStore::new();
        store.insert(Arc::new(resume_index()?));

        let model = Arc::new(ScriptedModel::new(vec!["I ", "have ", "5 years."]));
        Ok((ChatService::new(Arc::new(store), model.clone(), settings), model))
    }

    #[test]
    fn builder_defaults_match_default() -> anyhow::Result<()> {
        let settings = ChatSettingsBuilder::default().build()?;
        assert_eq!(settings, ChatSettings::default());
        assert_eq!(settings.similarity_top_k, 3);
        assert_eq!(settings.memory_token_limit, 512);
        Ok(())
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let result = ChatSettingsBuilder::default()
            .with_similarity_top_k(0_usize)
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn engines_answer_with_context() -> anyhow::Result<()> {
        let (service, model) = service(ChatSettings::default())?;
        assert!(service.is_ready());

        let mut engine = service.create_engine()?;
        let answer = engine
            .stream_chat("What is your Rust experience?", vec![ChatMessage::user("hi")])
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .concat();
        assert_eq!(answer, "I have 5 years.");

        let calls = model.calls.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert!(calls[0][0].content.contains("Five years of Rust services."));
        Ok(())
    }

    #[tokio::test]
    async fn engines_do_not_share_memory() -> anyhow::Result<()> {
        let (service, model) = service(ChatSettings::default())?;

        let mut first = service.create_engine()?;
        first.stream_chat("rust?", vec![ChatMessage::user("hi")]).await?;

        let mut second = service.create_engine()?;
        second.stream_chat("team?", Vec::new()).await?;

        let calls = model.calls.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(calls[0].len(), 3);
        assert_eq!(calls[1].len(), 2);
        assert_eq!(calls[1][1], ChatMessage::user("team?"));
        Ok(())
    }

    #[test]
    fn unknown_index_fails_engine_creation() -> anyhow::Result<()> {
        let settings = ChatSettings::builder()
            .with_index_name("portfolio")
            .build()?;
        let (service, _) = service(settings)?;

        assert!(!service.is_ready());
        assert!(matches!(
            service.create_engine(),
            Err(Error::IndexNotFound(_))
        ));
        Ok(())
    }
}
