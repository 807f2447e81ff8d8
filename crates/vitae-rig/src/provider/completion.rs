//! Streaming completion provider backed by rig.

use std::sync::Arc;

use futures::StreamExt;
use rig::completion::CompletionModel as RigCompletionModel;
use rig::message::Message;
use rig::prelude::CompletionClient;
#[cfg(feature = "ollama")]
use rig::providers::ollama;
use rig::providers::openai;
use rig::streaming::StreamedAssistantContent;

use super::LanguageModel;
use crate::chat::{ChatMessage, FragmentStream, Role};
use crate::{Error, Result, TRACING_TARGET_PROVIDER};

/// Completion provider that wraps the supported rig completion models.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

enum CompletionService {
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    #[cfg(feature = "ollama")]
    Ollama {
        model: ollama::CompletionModel,
        model_name: String,
    },
}

impl CompletionProvider {
    /// Creates an OpenAI provider using the chat-completions API.
    pub fn openai(api_key: &str, model_name: &str) -> Result<Self> {
        let client = openai::Client::new(api_key)
            .map_err(|e| Error::provider("openai", e))?
            .completions_api();

        Ok(Self(Arc::new(CompletionService::OpenAi {
            model: client.completion_model(model_name),
            model_name: model_name.to_owned(),
        })))
    }

    /// Creates a provider for a local Ollama server.
    #[cfg(feature = "ollama")]
    pub fn ollama(base_url: &str, model_name: &str) -> Result<Self> {
        let client = ollama::Client::builder()
            .api_key(rig::client::Nothing)
            .base_url(base_url)
            .build()
            .map_err(|e| Error::provider("ollama", e))?;

        Ok(Self(Arc::new(CompletionService::Ollama {
            model: client.completion_model(model_name),
            model_name: model_name.to_owned(),
        })))
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        match self.0.as_ref() {
            CompletionService::OpenAi { .. } => "openai",
            #[cfg(feature = "ollama")]
            CompletionService::Ollama { .. } => "ollama",
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for CompletionProvider {
    fn model_name(&self) -> &str {
        match self.0.as_ref() {
            CompletionService::OpenAi { model_name, .. } => model_name,
            #[cfg(feature = "ollama")]
            CompletionService::Ollama { model_name, .. } => model_name,
        }
    }

    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        let request = RigRequest::from_messages(messages)?;

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            provider = self.provider_name(),
            model = self.model_name(),
            history = request.history.len(),
            preamble_len = request.preamble.len(),
            "Opening completion stream"
        );

        match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => open_stream(model, "openai", request).await,
            #[cfg(feature = "ollama")]
            CompletionService::Ollama { model, .. } => open_stream(model, "ollama", request).await,
        }
    }
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.provider_name())
            .field("model", &self.model_name())
            .finish()
    }
}

/// A conversation split into the shape rig expects.
#[derive(Debug)]
struct RigRequest {
    preamble: String,
    prompt: String,
    history: Vec<Message>,
}

impl RigRequest {
    /// System messages become the preamble, the final user message the prompt.
    fn from_messages(mut messages: Vec<ChatMessage>) -> Result<Self> {
        let prompt = match messages.pop() {
            Some(message) if message.is_user() => message.content,
            _ => {
                return Err(Error::provider(
                    "completion",
                    "conversation must end with a user message",
                ));
            }
        };

        let mut preamble = Vec::new();
        let mut history = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                Role::System => preamble.push(message.content),
                Role::User => history.push(Message::user(message.content)),
                Role::Assistant => history.push(Message::assistant(message.content)),
            }
        }

        Ok(Self {
            preamble: preamble.join("\n\n"),
            prompt,
            history,
        })
    }
}

async fn open_stream<M>(
    model: &M,
    provider: &'static str,
    request: RigRequest,
) -> Result<FragmentStream>
where
    M: RigCompletionModel,
    M::StreamingResponse: 'static,
{
    let response = model
        .completion_request(request.prompt)
        .preamble(request.preamble)
        .messages(request.history)
        .stream()
        .await
        .map_err(|e| Error::provider(provider, e))?;

    let fragments = response.filter_map(move |item| async move {
        match item {
            Ok(StreamedAssistantContent::Text(text)) => Some(Ok(text.text)),
            Ok(_) => None,
            Err(e) => Some(Err(Error::provider(provider, e))),
        }
    });

    Ok(fragments.boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_splits_preamble_prompt_and_history() -> anyhow::Result<()> {
        let request = RigRequest::from_messages(vec![
            ChatMessage::system("persona"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("What is your experience?"),
        ])?;

        assert_eq!(request.preamble, "persona");
        assert_eq!(request.prompt, "What is your experience?");
        assert_eq!(request.history.len(), 2);
        Ok(())
    }

    #[test]
    fn request_requires_trailing_user_message() {
        let result = RigRequest::from_messages(vec![ChatMessage::assistant("hello")]);
        assert!(matches!(result, Err(Error::Provider { .. })));

        assert!(RigRequest::from_messages(Vec::new()).is_err());
    }

    #[test]
    fn openai_provider_reports_its_model() -> anyhow::Result<()> {
        let provider = CompletionProvider::openai("sk-test", "gpt-4o-mini")?;
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "gpt-4o-mini");
        Ok(())
    }
}
