//! Retrievers turn a query into context nodes.

use std::sync::Arc;

use super::index::VectorIndex;
use super::node::RetrievedNode;
use crate::{Result, TRACING_TARGET_RETRIEVAL};

/// Default number of nodes returned per query.
pub const DEFAULT_SIMILARITY_TOP_K: usize = 3;

/// Source of context nodes for a query.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the nodes relevant to `query`, best first.
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedNode>>;
}

/// Retriever returning the top-k most similar nodes of a vector index.
#[derive(Clone)]
pub struct VectorIndexRetriever {
    index: Arc<dyn VectorIndex>,
    similarity_top_k: usize,
}

impl VectorIndexRetriever {
    /// Creates a retriever over `index` with the default top-k.
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index,
            similarity_top_k: DEFAULT_SIMILARITY_TOP_K,
        }
    }

    /// Sets the number of nodes returned per query.
    pub fn with_similarity_top_k(mut self, similarity_top_k: usize) -> Self {
        self.similarity_top_k = similarity_top_k;
        self
    }

    /// Returns the number of nodes returned per query.
    #[inline]
    pub fn similarity_top_k(&self) -> usize {
        self.similarity_top_k
    }
}

#[async_trait::async_trait]
impl Retriever for VectorIndexRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedNode>> {
        let nodes = self.index.query(query, self.similarity_top_k).await?;

        tracing::debug!(
            target: TRACING_TARGET_RETRIEVAL,
            index = %self.index.name(),
            retrieved = nodes.len(),
            "Retrieved context nodes"
        );

        Ok(nodes)
    }
}

impl std::fmt::Debug for VectorIndexRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndexRetriever")
            .field("index", &self.index.name())
            .field("similarity_top_k", &self.similarity_top_k)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::resume_index;

    #[tokio::test]
    async fn retriever_uses_default_top_k() -> anyhow::Result<()> {
        let retriever = VectorIndexRetriever::new(Arc::new(resume_index()?));
        let nodes = retriever.retrieve("Tell me about your team").await?;

        assert_eq!(nodes.len(), DEFAULT_SIMILARITY_TOP_K);
        assert_eq!(nodes[0].id, "people");
        Ok(())
    }

    #[tokio::test]
    async fn retriever_honours_custom_top_k() -> anyhow::Result<()> {
        let retriever =
            VectorIndexRetriever::new(Arc::new(resume_index()?)).with_similarity_top_k(1);
        let nodes = retriever.retrieve("python").await?;

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "python");
        Ok(())
    }
}
