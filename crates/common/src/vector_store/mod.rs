//! Vector search adapter contract
//!
//! The engine treats the embedding model and vector store as one opaque
//! similarity-search oracle. Adapters own vector representations and
//! nearest-neighbor structures; indexers only hand over texts with metadata
//! and ask for scored matches under an exact-match metadata filter.

mod memory;

pub use memory::InMemoryVectorStore;

use crate::errors::Result;
use crate::models::Metadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One match returned by an adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub content: String,
    /// Adapter-defined score; results arrive already ordered best-first
    pub score: f32,
    pub metadata: Metadata,
}

/// Common trait for all vector store adapters
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed and store texts; `metadatas[i]` belongs to `texts[i]`
    async fn add_texts(&self, texts: &[String], metadatas: &[Metadata]) -> Result<()>;

    /// Return up to `k` stored texts whose metadata matches every
    /// `filter` entry exactly, best-first
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: &Metadata,
    ) -> Result<Vec<ScoredDocument>>;

    /// Remove every stored text whose metadata matches `filter`,
    /// returning how many were removed
    async fn delete(&self, filter: &Metadata) -> Result<usize>;

    /// Adapter name used in logs and errors
    fn name(&self) -> &str;

    /// Embedding model reported in index stats
    fn embedding_model(&self) -> &str;
}
