//! In-memory vector index over pre-computed embeddings.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::node::{IndexedNode, RetrievedNode};
use crate::provider::TextEmbedder;
use crate::{Error, Result, TRACING_TARGET_RETRIEVAL};

/// A searchable collection of embedded text fragments.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the index name.
    fn name(&self) -> &str;

    /// Returns the number of nodes in the index.
    fn node_count(&self) -> usize;

    /// Returns the `top_k` nodes most similar to `text`, best first.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievedNode>>;
}

/// Vector index that keeps every node in memory and scores them by cosine similarity.
pub struct EmbeddedIndex {
    name: String,
    nodes: Vec<IndexedNode>,
    ndims: usize,
    embedder: Arc<dyn TextEmbedder>,
}

impl EmbeddedIndex {
    /// Creates an index from nodes that share one embedding dimensionality.
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<IndexedNode>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Result<Self> {
        let name = name.into();
        let ndims = nodes.first().map_or(0, |node| node.embedding.len());

        if let Some(node) = nodes.iter().find(|node| node.embedding.len() != ndims) {
            return Err(Error::config(format!(
                "index '{name}': node '{}' has {} dimensions, expected {ndims}",
                node.id,
                node.embedding.len()
            )));
        }

        Ok(Self {
            name,
            nodes,
            ndims,
            embedder,
        })
    }

    /// Returns the embedding dimensionality of the nodes.
    #[inline]
    pub fn ndims(&self) -> usize {
        self.ndims
    }
}

#[async_trait::async_trait]
impl VectorIndex for EmbeddedIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievedNode>> {
        if top_k == 0 || self.nodes.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text).await?;
        if query.len() != self.ndims {
            return Err(Error::retrieval(format!(
                "query embedding has {} dimensions, index '{}' has {}",
                query.len(),
                self.name,
                self.ndims
            )));
        }

        let mut scored = self
            .nodes
            .iter()
            .map(|node| (node, cosine_similarity(&query, &node.embedding)))
            .collect::<Vec<_>>();

        // Stable sort: equal scores keep index order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        tracing::debug!(
            target: TRACING_TARGET_RETRIEVAL,
            index = %self.name,
            top_k,
            returned = scored.len(),
            best_score = scored.first().map(|(_, score)| *score),
            "Vector index queried"
        );

        Ok(scored
            .into_iter()
            .map(|(node, score)| RetrievedNode::from_indexed(node, score))
            .collect())
    }
}

impl fmt::Debug for EmbeddedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedIndex")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("ndims", &self.ndims)
            .finish_non_exhaustive()
    }
}

/// Cosine similarity of two equally sized vectors; zero when either has no magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Embeds text as keyword presence flags for ("rust", "team", "python").
    pub(crate) struct KeywordEmbedder;

    #[async_trait::async_trait]
    impl TextEmbedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f64>> {
            let text = text.to_lowercase();
            Ok(["rust", "team", "python"]
                .iter()
                .map(|keyword| if text.contains(keyword) { 1.0 } else { 0.0 })
                .collect())
        }
    }

    pub(crate) fn node(id: &str, text: &str, embedding: [f64; 3]) -> IndexedNode {
        IndexedNode {
            id: id.to_owned(),
            text: text.to_owned(),
            embedding: embedding.to_vec(),
            metadata: Default::default(),
        }
    }

    pub(crate) fn resume_index() -> Result<EmbeddedIndex> {
        EmbeddedIndex::new(
            "resume",
            vec![
                node("python", "Two years of Python scripting.", [0.0, 0.0, 1.0]),
                node("rust", "Five years of Rust services.", [1.0, 0.0, 0.0]),
                node("lead", "Led a Rust platform team.", [1.0, 1.0, 0.0]),
                node("people", "Mentored a team of four.", [0.0, 1.0, 0.0]),
            ],
            Arc::new(KeywordEmbedder),
        )
    }

    #[test]
    fn cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn query_returns_best_matches_first() -> anyhow::Result<()> {
        let index = resume_index()?;
        let results = index.query("How much Rust have you written?", 3).await?;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "rust");
        assert_eq!(results[1].id, "lead");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
        Ok(())
    }

    #[tokio::test]
    async fn ties_keep_index_order() -> anyhow::Result<()> {
        let index = resume_index()?;
        let results = index.query("What is your hobby?", 4).await?;

        let ids = results.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["python", "rust", "lead", "people"]);
        Ok(())
    }

    #[tokio::test]
    async fn zero_top_k_skips_embedding() -> anyhow::Result<()> {
        let index = resume_index()?;
        assert!(index.query("rust", 0).await?.is_empty());
        Ok(())
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let mut odd = node("odd", "x", [1.0, 0.0, 0.0]);
        odd.embedding.push(1.0);

        let result = EmbeddedIndex::new(
            "broken",
            vec![node("a", "y", [1.0, 0.0, 0.0]), odd],
            Arc::new(KeywordEmbedder),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn query_dimension_mismatch_is_a_retrieval_error() -> anyhow::Result<()> {
        let index = EmbeddedIndex::new(
            "wide",
            vec![IndexedNode {
                id: "a".into(),
                text: "a".into(),
                embedding: vec![1.0; 8],
                metadata: Default::default(),
            }],
            Arc::new(KeywordEmbedder),
        )?;

        let result = index.query("rust", 1).await;
        assert!(matches!(result, Err(Error::Retrieval(_))));
        Ok(())
    }
}
