//! Search results returned by every indexer

use super::chunk::{Chunk, ChunkType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ranked passage handed back to the caller.
///
/// `score` is on the producing strategy's own scale (BM25 magnitude or the
/// adapter's similarity) and must not be compared across indexer types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub score: f32,
    pub source_chunk: Chunk,
    pub document_id: Uuid,
    pub chunk_index: usize,
}

impl SearchResult {
    /// Wrap a chunk with a score
    pub fn from_chunk(chunk: Chunk, score: f32) -> Self {
        Self {
            content: chunk.content.clone(),
            document_id: chunk.document_id,
            chunk_index: chunk.chunk_index,
            source_chunk: chunk,
            score,
        }
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.source_chunk.chunk_type
    }

    pub fn session_id(&self) -> &str {
        &self.source_chunk.session_id
    }
}

/// Outcome of a single `Indexer::index` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub document_id: Uuid,
    pub chunks_created: usize,
    pub strategy: String,
}
