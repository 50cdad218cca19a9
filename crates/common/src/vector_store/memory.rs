//! In-process vector store over an [`Embedder`]
//!
//! Brute-force cosine similarity with exact-match metadata filters.
//! Suitable for tests, local runs and single-resume sessions.

use super::{ScoredDocument, VectorStore};
use crate::embeddings::{cosine_similarity, Embedder};
use crate::errors::{AppError, Result};
use crate::models::Metadata;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct StoredText {
    content: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

impl StoredText {
    fn matches(&self, filter: &Metadata) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.metadata.get(key) == Some(value))
    }
}

pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<StoredText>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored texts across all sessions
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_texts(&self, texts: &[String], metadatas: &[Metadata]) -> Result<()> {
        if texts.len() != metadatas.len() {
            return Err(AppError::Validation {
                message: format!(
                    "{} texts but {} metadata entries",
                    texts.len(),
                    metadatas.len()
                ),
                field: Some("metadatas".to_string()),
            });
        }

        let embeddings = self.embedder.embed_batch(texts).await?;

        let mut entries = self.entries.write().await;
        for ((content, metadata), embedding) in texts.iter().zip(metadatas).zip(embeddings) {
            entries.push(StoredText {
                content: content.clone(),
                metadata: metadata.clone(),
                embedding,
            });
        }

        debug!(added = texts.len(), total = entries.len(), "Texts added to in-memory store");
        Ok(())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: &Metadata,
    ) -> Result<Vec<ScoredDocument>> {
        if k == 0 {
            return Ok(vec![]);
        }

        let query_embedding = self.embedder.embed(query).await?;

        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredDocument> = entries
            .iter()
            .filter(|entry| entry.matches(filter))
            .map(|entry| ScoredDocument {
                content: entry.content.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn delete(&self, filter: &Metadata) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| !entry.matches(filter));
        Ok(before - entries.len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }

    fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }
}
