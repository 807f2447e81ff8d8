//! Query embedding provider backed by rig.

use rig::embeddings::EmbeddingModel as RigEmbeddingModel;
use rig::prelude::EmbeddingsClient;
#[cfg(feature = "ollama")]
use rig::providers::ollama;
use rig::providers::openai;

use super::TextEmbedder;
use crate::{Error, Result, TRACING_TARGET_PROVIDER};

/// Embedding provider that wraps the supported rig embedding models.
#[derive(Clone)]
pub enum EmbeddingProvider {
    /// OpenAI embedding model.
    OpenAi {
        model: openai::EmbeddingModel,
        model_name: String,
    },
    /// Ollama embedding model.
    #[cfg(feature = "ollama")]
    Ollama {
        client: ollama::Client,
        model_name: String,
        ndims: usize,
    },
}

impl EmbeddingProvider {
    /// Creates an OpenAI embedding provider.
    pub fn openai(api_key: &str, model_name: &str, ndims: usize) -> Result<Self> {
        let client = openai::Client::new(api_key).map_err(|e| Error::provider("openai", e))?;

        Ok(Self::OpenAi {
            model: client.embedding_model_with_ndims(model_name, ndims),
            model_name: model_name.to_owned(),
        })
    }

    /// Creates an embedding provider for a local Ollama server.
    #[cfg(feature = "ollama")]
    pub fn ollama(base_url: &str, model_name: &str, ndims: usize) -> Result<Self> {
        let client = ollama::Client::builder()
            .api_key(rig::client::Nothing)
            .base_url(base_url)
            .build()
            .map_err(|e| Error::provider("ollama", e))?;

        Ok(Self::Ollama {
            client,
            model_name: model_name.to_owned(),
            ndims,
        })
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self {
            Self::OpenAi { model_name, .. } => model_name,
            #[cfg(feature = "ollama")]
            Self::Ollama { model_name, .. } => model_name,
        }
    }

    /// Returns the number of dimensions of produced embeddings.
    pub fn ndims(&self) -> usize {
        match self {
            Self::OpenAi { model, .. } => model.ndims(),
            #[cfg(feature = "ollama")]
            Self::Ollama { ndims, .. } => *ndims,
        }
    }
}

#[async_trait::async_trait]
impl TextEmbedder for EmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let embedding = match self {
            Self::OpenAi { model, .. } => model.embed_text(text).await,
            #[cfg(feature = "ollama")]
            Self::Ollama {
                client,
                model_name,
                ndims,
            } => {
                let model = ollama::EmbeddingModel::new(client.clone(), model_name, *ndims);
                model.embed_text(text).await
            }
        }
        .map_err(|e| Error::embedding(format!("{}: {e}", self.model_name())))?;

        tracing::trace!(
            target: TRACING_TARGET_PROVIDER,
            model = self.model_name(),
            ndims = embedding.vec.len(),
            "Embedded query"
        );

        Ok(embedding.vec)
    }
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi { model_name, .. } => f
                .debug_struct("EmbeddingProvider::OpenAi")
                .field("model", model_name)
                .field("ndims", &self.ndims())
                .finish(),
            #[cfg(feature = "ollama")]
            Self::Ollama {
                model_name, ndims, ..
            } => f
                .debug_struct("EmbeddingProvider::Ollama")
                .field("model", model_name)
                .field("ndims", ndims)
                .finish(),
        }
    }
}
