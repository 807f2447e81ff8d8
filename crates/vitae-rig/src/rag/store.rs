//! Loading and lookup of persisted indexes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::index::{EmbeddedIndex, VectorIndex};
use super::node::IndexFile;
use crate::provider::TextEmbedder;
use crate::{Error, Result, TRACING_TARGET_RETRIEVAL};

/// Lookup of loaded indexes by name.
pub trait IndexProvider: Send + Sync {
    /// Returns the index registered under `name`.
    fn get_index(&self, name: &str) -> Result<Arc<dyn VectorIndex>>;
}

/// Read-only set of indexes, loaded once at startup.
#[derive(Clone, Default)]
pub struct IndexStore {
    indexes: HashMap<String, Arc<dyn VectorIndex>>,
}

impl IndexStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an index under its own name, replacing any previous one.
    pub fn insert(&mut self, index: Arc<dyn VectorIndex>) {
        self.indexes.insert(index.name().to_owned(), index);
    }

    /// Returns the names of all loaded indexes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    /// Returns the number of loaded indexes.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if no index is loaded.
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Loads every `*.json` index file of `dir`.
    ///
    /// Each file holds `{"nodes": [...]}` and is registered under its file
    /// stem, so `storage/resume.json` becomes the index `resume`. The
    /// embedder is used to embed queries against the loaded nodes.
    pub async fn load_dir(dir: impl AsRef<Path>, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new();

        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            Error::config(format!("cannot read index directory {}: {e}", dir.display()))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let bytes = tokio::fs::read(&path).await?;
            let file: IndexFile = serde_json::from_slice(&bytes).map_err(|e| {
                Error::config(format!("invalid index file {}: {e}", path.display()))
            })?;

            let index = EmbeddedIndex::new(name, file.nodes, embedder.clone())?;

            tracing::info!(
                target: TRACING_TARGET_RETRIEVAL,
                index = name,
                nodes = index.node_count(),
                ndims = index.ndims(),
                path = %path.display(),
                "Loaded vector index"
            );

            store.insert(Arc::new(index));
        }

        Ok(store)
    }
}

impl IndexProvider for IndexStore {
    fn get_index(&self, name: &str) -> Result<Arc<dyn VectorIndex>> {
        self.indexes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::index_not_found(name))
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("indexes", &self.indexes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::KeywordEmbedder;

    const RESUME: &str = r#"{
        "nodes": [
            {"id": "1", "text": "Five years of Rust.", "embedding": [1.0, 0.0, 0.0]},
            {"id": "2", "text": "Led a team.", "embedding": [0.0, 1.0, 0.0], "metadata": {"page": 2}}
        ]
    }"#;

    #[tokio::test]
    async fn loads_json_files_by_stem() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join("resume.json"), RESUME).await?;
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await?;

        let store = IndexStore::load_dir(dir.path(), Arc::new(KeywordEmbedder)).await?;
        assert_eq!(store.len(), 1);

        let index = store.get_index("resume")?;
        assert_eq!(index.node_count(), 2);

        let nodes = index.query("rust", 1).await?;
        assert_eq!(nodes[0].text, "Five years of Rust.");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_index_is_not_found() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = IndexStore::load_dir(dir.path(), Arc::new(KeywordEmbedder)).await?;

        assert!(store.is_empty());
        assert!(matches!(
            store.get_index("resume"),
            Err(Error::IndexNotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_fails_loading() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join("resume.json"), r#"{"nodes": 3}"#).await?;

        let result = IndexStore::load_dir(dir.path(), Arc::new(KeywordEmbedder)).await;
        assert!(matches!(result, Err(Error::Config(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_fails_loading() {
        let result =
            IndexStore::load_dir("/nonexistent/vitae/storage", Arc::new(KeywordEmbedder)).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
