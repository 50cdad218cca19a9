//! Per-indexer statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters shared by every strategy plus strategy-specific details.
///
/// Counters only grow, except on session deletion which resets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents_indexed: usize,
    pub chunks_created: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub strategy: String,
    pub details: StrategyDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "indexer_type", rename_all = "snake_case")]
pub enum StrategyDetails {
    Keyword {
        total_chunks: usize,
        unique_terms: usize,
        avg_chunk_length: f32,
        bm25_k1: f32,
        bm25_b: f32,
    },
    Semantic {
        total_chunks: usize,
        embedding_model: String,
        chunk_size: usize,
        chunk_overlap: usize,
    },
    EnhancedSemantic {
        total_chunks: usize,
        section_chunks: usize,
        contact_chunks: usize,
        semantic_chunks: usize,
        raw_documents: usize,
        embedding_model: String,
        chunk_size: usize,
        chunk_overlap: usize,
    },
}

impl StrategyDetails {
    pub fn total_chunks(&self) -> usize {
        match self {
            StrategyDetails::Keyword { total_chunks, .. }
            | StrategyDetails::Semantic { total_chunks, .. }
            | StrategyDetails::EnhancedSemantic { total_chunks, .. } => *total_chunks,
        }
    }
}

/// The shared counters every indexer owns independently
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsCounters {
    pub documents_indexed: usize,
    pub chunks_created: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StatsCounters {
    /// Record one ingested document
    pub fn record(&mut self, chunks_added: usize) {
        self.documents_indexed += 1;
        self.chunks_created += chunks_added;
        self.last_updated = Some(Utc::now());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self, strategy: &str, details: StrategyDetails) -> IndexStats {
        IndexStats {
            documents_indexed: self.documents_indexed,
            chunks_created: self.chunks_created,
            last_updated: self.last_updated,
            strategy: strategy.to_string(),
            details,
        }
    }
}
