//! Retrieval over pre-built vector indexes.
//!
//! Indexes are persisted as JSON files holding text fragments and their
//! embeddings. At startup an [`IndexStore`] loads them, and for each chat a
//! [`VectorIndexRetriever`] picks the fragments closest to the question.
//!
//! ```ignore
//! let store = IndexStore::load_dir("./storage", embedder).await?;
//! let retriever = VectorIndexRetriever::new(store.get_index("resume")?);
//! let nodes = retriever.retrieve("What did you work on last?").await?;
//! ```

mod index;
mod node;
mod retriever;
mod store;

pub use self::index::{EmbeddedIndex, VectorIndex, cosine_similarity};
pub use self::node::{IndexFile, IndexedNode, RetrievedNode};
pub use self::retriever::{DEFAULT_SIMILARITY_TOP_K, Retriever, VectorIndexRetriever};
pub use self::store::{IndexProvider, IndexStore};

#[cfg(test)]
pub(crate) use self::index::tests::{KeywordEmbedder, resume_index};
