//! Configuration for the model providers and the index storage.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, EmbeddingProvider};
use crate::{Error, Result};

/// Backend serving the completion and embedding models.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI hosted models.
    #[default]
    #[cfg_attr(feature = "config", value(name = "openai"))]
    OpenAi,
    /// Local Ollama server.
    #[cfg(feature = "ollama")]
    Ollama,
}

/// Configuration for the language model, embeddings and index storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RigConfig {
    /// Backend for completions and embeddings.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "LLM_PROVIDER", value_enum, default_value_t = LlmProvider::OpenAi)
    )]
    pub llm_provider: LlmProvider,

    /// OpenAI API key, required for the `openai` provider.
    #[cfg_attr(feature = "config", arg(long, env = "OPENAI_API_KEY"))]
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Ollama server URL.
    #[cfg(feature = "ollama")]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")
    )]
    pub ollama_base_url: String,

    /// Chat completion model name.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "COMPLETION_MODEL", default_value = "gpt-4o-mini")
    )]
    pub completion_model: String,

    /// Embedding model name; must match the model the index was built with.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_MODEL", default_value = "text-embedding-ada-002")
    )]
    pub embedding_model: String,

    /// Embedding dimensions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_DIMENSIONS", default_value = "1536")
    )]
    pub embedding_dimensions: usize,

    /// Directory holding the persisted `*.json` indexes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "INDEX_STORAGE_DIR", default_value = "./storage")
    )]
    pub index_storage_dir: PathBuf,

    /// Name of the index queried by the chat endpoint.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "INDEX_NAME", default_value = "resume")
    )]
    pub index_name: String,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::default(),
            openai_api_key: None,
            #[cfg(feature = "ollama")]
            ollama_base_url: "http://localhost:11434".to_owned(),
            completion_model: "gpt-4o-mini".to_owned(),
            embedding_model: "text-embedding-ada-002".to_owned(),
            embedding_dimensions: 1536,
            index_storage_dir: PathBuf::from("./storage"),
            index_name: "resume".to_owned(),
        }
    }
}

impl RigConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.completion_model.trim().is_empty() {
            return Err(Error::config("completion model cannot be empty"));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(Error::config("embedding model cannot be empty"));
        }

        if self.embedding_dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than 0"));
        }

        if self.index_name.trim().is_empty() {
            return Err(Error::config("index name cannot be empty"));
        }

        if self.llm_provider == LlmProvider::OpenAi && self.openai_api_key().is_err() {
            return Err(Error::config("OPENAI_API_KEY is required for the openai provider"));
        }

        Ok(())
    }

    /// Creates the completion provider from this configuration.
    pub fn completion_provider(&self) -> Result<CompletionProvider> {
        match self.llm_provider {
            LlmProvider::OpenAi => {
                CompletionProvider::openai(self.openai_api_key()?, &self.completion_model)
            }
            #[cfg(feature = "ollama")]
            LlmProvider::Ollama => {
                CompletionProvider::ollama(&self.ollama_base_url, &self.completion_model)
            }
        }
    }

    /// Creates the embedding provider from this configuration.
    pub fn embedding_provider(&self) -> Result<EmbeddingProvider> {
        match self.llm_provider {
            LlmProvider::OpenAi => EmbeddingProvider::openai(
                self.openai_api_key()?,
                &self.embedding_model,
                self.embedding_dimensions,
            ),
            #[cfg(feature = "ollama")]
            LlmProvider::Ollama => EmbeddingProvider::ollama(
                &self.ollama_base_url,
                &self.embedding_model,
                self.embedding_dimensions,
            ),
        }
    }

    fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::config("missing OpenAI API key"))
    }
}
