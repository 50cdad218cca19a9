//! Keyword indexing with in-process BM25 ranking
//!
//! Chunks are sentence-packed and scored against the query terms with BM25.
//! Session and metadata filters are applied before scoring.

use super::terms::{Bm25Params, TermIndex};
use super::{ensure_document, scoped_filter, tokenize, Indexer};
use async_trait::async_trait;
use resumerag_common::config::IndexingConfig;
use resumerag_common::errors::Result;
use resumerag_common::metrics::{record_ingestion, record_search, Stopwatch};
use resumerag_common::models::{
    Chunk, IndexOutcome, IndexStats, Metadata, SearchResult, StatsCounters, StrategyDetails,
};
use resumerag_ingestion::chunker::{Chunker, SentenceChunker};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const STRATEGY: &str = "keyword";

/// BM25 indexer holding its chunks and term tables in memory
pub struct KeywordIndexer {
    session_id: String,
    chunker: SentenceChunker,
    params: Bm25Params,
    /// Parallel to the entries of `terms`
    chunks: Vec<Chunk>,
    terms: TermIndex,
    counters: StatsCounters,
}

impl KeywordIndexer {
    pub fn new(session_id: impl Into<String>, config: Arc<IndexingConfig>) -> Self {
        Self {
            session_id: session_id.into(),
            chunker: SentenceChunker::from_config(&config),
            params: Bm25Params {
                k1: config.bm25_k1,
                b: config.bm25_b,
            },
            chunks: Vec::new(),
            terms: TermIndex::new(),
            counters: StatsCounters::default(),
        }
    }

    /// Number of chunks containing `term`
    pub fn document_frequency(&self, term: &str) -> usize {
        self.terms.document_frequency(term)
    }
}

#[async_trait]
impl Indexer for KeywordIndexer {
    async fn index(&mut self, text: &str, metadata: Metadata) -> Result<IndexOutcome> {
        ensure_document(text)?;
        let watch = Stopwatch::start();
        let document_id = Uuid::new_v4();

        let candidates = self.chunker.chunk(text);
        let chunks_created = candidates.len();

        for (chunk_index, candidate) in candidates.into_iter().enumerate() {
            let chunk = Chunk::new(
                document_id,
                &self.session_id,
                chunk_index,
                candidate.content,
                candidate.chunk_type,
                candidate.section_tag,
                &metadata,
            );
            self.terms.insert(&tokenize(&chunk.content));
            self.chunks.push(chunk);
        }

        self.terms.refresh_average();
        self.counters.record(chunks_created);
        record_ingestion(watch.elapsed_secs(), STRATEGY, chunks_created);

        info!(
            session_id = %self.session_id,
            document_id = %document_id,
            chunks_created,
            unique_terms = self.terms.unique_terms(),
            "Document indexed"
        );

        Ok(IndexOutcome {
            document_id,
            chunks_created,
            strategy: STRATEGY.to_string(),
        })
    }

    async fn search(&self, query: &str, top_k: usize, filters: &Metadata) -> Vec<SearchResult> {
        let watch = Stopwatch::start();
        let query_terms = tokenize(query);

        if top_k == 0 || query_terms.is_empty() {
            return Vec::new();
        }

        let filter = scoped_filter(filters, &self.session_id);

        let mut results: Vec<SearchResult> = self
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.matches(&filter))
            .filter_map(|(position, chunk)| {
                let score = self.terms.score(position, &query_terms, self.params);
                (score > 0.0).then(|| SearchResult::from_chunk(chunk.clone(), score))
            })
            .collect();

        // Stable sort keeps ingestion order on ties
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        record_search(watch.elapsed_secs(), STRATEGY, results.len());
        debug!(
            session_id = %self.session_id,
            query_terms = query_terms.len(),
            result_count = results.len(),
            "Keyword search complete"
        );

        results
    }

    fn stats(&self) -> IndexStats {
        self.counters.snapshot(
            STRATEGY,
            StrategyDetails::Keyword {
                total_chunks: self.chunks.len(),
                unique_terms: self.terms.unique_terms(),
                avg_chunk_length: self.terms.average_length(),
                bm25_k1: self.params.k1,
                bm25_b: self.params.b,
            },
        )
    }

    async fn delete_session_data(&mut self) -> bool {
        let session_id = self.session_id.clone();
        let keep: Vec<bool> = self
            .chunks
            .iter()
            .map(|chunk| chunk.session_id != session_id)
            .collect();
        let removed = keep.iter().filter(|kept| !**kept).count();

        self.chunks.retain(|chunk| chunk.session_id != session_id);
        self.terms.retain_positions(|position| keep[position]);
        self.counters.reset();

        info!(session_id = %session_id, removed, "Session data deleted");
        true
    }

    fn strategy(&self) -> &'static str {
        STRATEGY
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
