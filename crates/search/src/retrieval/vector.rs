//! Semantic indexing through a vector store adapter
//!
//! Chunks are produced by the recursive separator cascade and handed to the
//! adapter with their metadata. Searches are always scoped to the session.

use super::{ensure_document, into_session_results, scoped_filter, Indexer};
use async_trait::async_trait;
use resumerag_common::config::IndexingConfig;
use resumerag_common::errors::Result;
use resumerag_common::metrics::{
    record_ingestion, record_search, record_strategy_failure, Stopwatch,
};
use resumerag_common::models::{
    keys, Chunk, IndexOutcome, IndexStats, Metadata, SearchResult, StatsCounters, StrategyDetails,
};
use resumerag_common::vector_store::VectorStore;
use resumerag_ingestion::chunker::{Chunker, RecursiveChunker};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const STRATEGY: &str = "semantic";

/// Vector-store backed indexer
pub struct SemanticIndexer {
    session_id: String,
    config: Arc<IndexingConfig>,
    store: Arc<dyn VectorStore>,
    chunker: RecursiveChunker,
    total_chunks: usize,
    counters: StatsCounters,
}

impl SemanticIndexer {
    pub fn new(
        session_id: impl Into<String>,
        config: Arc<IndexingConfig>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            chunker: RecursiveChunker::from_config(&config),
            config,
            store,
            total_chunks: 0,
            counters: StatsCounters::default(),
        }
    }

    fn session_filter(&self) -> Metadata {
        let mut filter = Metadata::new();
        filter.insert(keys::SESSION_ID.to_string(), self.session_id.clone());
        filter
    }
}

#[async_trait]
impl Indexer for SemanticIndexer {
    async fn index(&mut self, text: &str, metadata: Metadata) -> Result<IndexOutcome> {
        ensure_document(text)?;
        let watch = Stopwatch::start();
        let document_id = Uuid::new_v4();

        let (texts, metadatas): (Vec<String>, Vec<Metadata>) = self
            .chunker
            .chunk(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, candidate)| {
                let chunk = Chunk::new(
                    document_id,
                    &self.session_id,
                    chunk_index,
                    candidate.content,
                    candidate.chunk_type,
                    candidate.section_tag,
                    &metadata,
                );
                (chunk.content, chunk.metadata)
            })
            .unzip();
        let chunks_created = texts.len();

        if let Err(e) = self.store.add_texts(&texts, &metadatas).await {
            error!(
                session_id = %self.session_id,
                store = self.store.name(),
                error = %e,
                "Failed to add chunks to vector store"
            );
            return Err(e);
        }

        self.total_chunks += chunks_created;
        self.counters.record(chunks_created);
        record_ingestion(watch.elapsed_secs(), STRATEGY, chunks_created);

        info!(
            session_id = %self.session_id,
            document_id = %document_id,
            chunks_created,
            "Document indexed"
        );

        Ok(IndexOutcome {
            document_id,
            chunks_created,
            strategy: STRATEGY.to_string(),
        })
    }

    async fn search(&self, query: &str, top_k: usize, filters: &Metadata) -> Vec<SearchResult> {
        if top_k == 0 {
            return Vec::new();
        }

        let watch = Stopwatch::start();
        let filter = scoped_filter(filters, &self.session_id);

        let results = match self.store.similarity_search_with_score(query, top_k, &filter).await {
            Ok(documents) => into_session_results(documents, &self.session_id, 0.0),
            Err(e) => {
                warn!(
                    session_id = %self.session_id,
                    store = self.store.name(),
                    error = %e,
                    "Vector search failed, returning no results"
                );
                record_strategy_failure(STRATEGY, "vector");
                Vec::new()
            }
        };

        record_search(watch.elapsed_secs(), STRATEGY, results.len());
        debug!(
            session_id = %self.session_id,
            result_count = results.len(),
            "Semantic search complete"
        );

        results
    }

    fn stats(&self) -> IndexStats {
        self.counters.snapshot(
            STRATEGY,
            StrategyDetails::Semantic {
                total_chunks: self.total_chunks,
                embedding_model: self.store.embedding_model().to_string(),
                chunk_size: self.config.chunk_size,
                chunk_overlap: self.config.chunk_overlap,
            },
        )
    }

    async fn delete_session_data(&mut self) -> bool {
        match self.store.delete(&self.session_filter()).await {
            Ok(removed) => {
                self.total_chunks = 0;
                self.counters.reset();
                info!(session_id = %self.session_id, removed, "Session data deleted");
                true
            }
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "Failed to delete session data");
                false
            }
        }
    }

    fn strategy(&self) -> &'static str {
        STRATEGY
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
