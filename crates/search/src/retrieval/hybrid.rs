//! Enhanced semantic indexing for resumes
//!
//! Indexes section, contact and semantic chunks together, then answers
//! queries by fusing three sub-searches:
//! - Session-scoped vector search
//! - Contact-only vector search with a score boost, for contact-like queries
//! - Keyword scan over the raw documents when the vector searches come up short

use super::fusion::{dedup_by_prefix, rank_and_truncate, StrategyOutcome};
use super::{ensure_document, into_session_results, scoped_filter, Indexer};
use async_trait::async_trait;
use resumerag_common::config::IndexingConfig;
use resumerag_common::errors::Result;
use resumerag_common::metrics::{record_ingestion, record_search, Stopwatch};
use resumerag_common::models::{
    keys, Chunk, ChunkType, IndexOutcome, IndexStats, Metadata, SearchResult, StatsCounters,
    StrategyDetails,
};
use resumerag_common::vector_store::VectorStore;
use resumerag_ingestion::chunker::{window_around, Chunker};
use resumerag_ingestion::resume::ResumeChunker;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const STRATEGY: &str = "enhanced_semantic";

/// Query words that trigger the contact sub-search
const CONTACT_TRIGGERS: &[&str] = &["name", "email", "phone", "linkedin", "github"];

/// Full text of an indexed document, kept for the keyword fallback
struct RawDocument {
    document_id: Uuid,
    text: String,
    folded: FoldedText,
    metadata: Metadata,
}

/// Unicode-lowercased copy of a text that maps byte offsets back to the
/// source. Lowercasing can change a character's encoded length, so offsets
/// found in the folded copy are not valid in the original.
struct FoldedText {
    folded: String,
    /// Source byte offset for every folded byte, plus the source length
    origin: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);

        for (idx, c) in text.char_indices() {
            for lower in c.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat(idx).take(lower.len_utf8()));
            }
        }
        origin.push(text.len());

        Self { folded, origin }
    }

    /// Source byte range of the first occurrence of an already-lowercased term
    fn find(&self, term: &str) -> Option<(usize, usize)> {
        let start = self.folded.find(term)?;
        let end = start + term.len();
        Some((self.origin[start], self.origin[end].max(self.origin[start])))
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TypeCounts {
    section: usize,
    contact: usize,
    semantic: usize,
}

impl TypeCounts {
    fn add(&mut self, chunk_type: ChunkType) {
        match chunk_type {
            ChunkType::Section => self.section += 1,
            ChunkType::Contact => self.contact += 1,
            ChunkType::Semantic | ChunkType::Keyword => self.semantic += 1,
        }
    }

    fn total(&self) -> usize {
        self.section + self.contact + self.semantic
    }
}

/// Multi-strategy indexer tuned for resumes
pub struct EnhancedSemanticIndexer {
    session_id: String,
    config: Arc<IndexingConfig>,
    store: Arc<dyn VectorStore>,
    chunker: ResumeChunker,
    documents: Vec<RawDocument>,
    counts: TypeCounts,
    counters: StatsCounters,
}

impl EnhancedSemanticIndexer {
    pub fn new(
        session_id: impl Into<String>,
        config: Arc<IndexingConfig>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        Ok(Self {
            session_id: session_id.into(),
            chunker: ResumeChunker::new(&config)?,
            config,
            store,
            documents: Vec::new(),
            counts: TypeCounts::default(),
            counters: StatsCounters::default(),
        })
    }

    async fn vector_search(&self, query: &str, top_k: usize, filter: &Metadata) -> StrategyOutcome {
        let result = self
            .store
            .similarity_search_with_score(query, top_k, filter)
            .await
            .map(|documents| into_session_results(documents, &self.session_id, 0.0));
        StrategyOutcome::from_result(result)
    }

    async fn contact_search(&self, query: &str, filters: &Metadata) -> StrategyOutcome {
        let lowered = query.to_lowercase();
        if !CONTACT_TRIGGERS.iter().any(|trigger| lowered.contains(trigger)) {
            return StrategyOutcome::Skipped;
        }

        let mut filter = filters.clone();
        filter.insert(keys::CHUNK_TYPE.to_string(), ChunkType::Contact.to_string());
        let filter = scoped_filter(&filter, &self.session_id);

        let result = self
            .store
            .similarity_search_with_score(query, self.config.contact_top_k, &filter)
            .await
            .map(|documents| {
                into_session_results(documents, &self.session_id, self.config.contact_boost)
            });
        StrategyOutcome::from_result(result)
    }

    /// Case-insensitive scan of every raw document for each query word.
    ///
    /// Each hit yields a snippet around the word's first occurrence, scored
    /// by how often the word appears in that snippet.
    fn keyword_fallback(&self, query: &str, filters: &Metadata) -> StrategyOutcome {
        let filter = scoped_filter(filters, &self.session_id);
        let mut results = Vec::new();

        for term in query.to_lowercase().split_whitespace() {
            for document in &self.documents {
                let Some((start, end)) = document.folded.find(term) else {
                    continue;
                };

                let snippet =
                    window_around(&document.text, start, end, self.config.fallback_window).trim();
                let occurrences = snippet.to_lowercase().matches(term).count();

                let chunk = Chunk::new(
                    document.document_id,
                    &self.session_id,
                    0,
                    snippet.to_string(),
                    ChunkType::Keyword,
                    Some("fallback".to_string()),
                    &document.metadata,
                );
                if !chunk.matches(&filter) {
                    continue;
                }

                let score = occurrences as f32 * self.config.fallback_term_weight;
                results.push(SearchResult::from_chunk(chunk, score));
            }
        }

        StrategyOutcome::Completed(results)
    }
}

#[async_trait]
impl Indexer for EnhancedSemanticIndexer {
    async fn index(&mut self, text: &str, metadata: Metadata) -> Result<IndexOutcome> {
        ensure_document(text)?;
        let watch = Stopwatch::start();
        let document_id = Uuid::new_v4();

        let mut counts = TypeCounts::default();
        let mut texts = Vec::new();
        let mut metadatas = Vec::new();

        for (chunk_index, candidate) in self.chunker.chunk(text).into_iter().enumerate() {
            let mut chunk = Chunk::new(
                document_id,
                &self.session_id,
                chunk_index,
                candidate.content,
                candidate.chunk_type,
                candidate.section_tag,
                &metadata,
            );
            if let Some(value) = candidate.extracted_value {
                chunk.metadata.insert(keys::EXTRACTED_VALUE.to_string(), value);
            }

            counts.add(chunk.chunk_type);
            texts.push(chunk.content);
            metadatas.push(chunk.metadata);
        }
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

        self.documents.push(RawDocument {
            document_id,
            text: text.to_string(),
            folded: FoldedText::new(text),
            metadata,
        });
        self.counts.section += counts.section;
        self.counts.contact += counts.contact;
        self.counts.semantic += counts.semantic;
        self.counters.record(chunks_created);
        record_ingestion(watch.elapsed_secs(), STRATEGY, chunks_created);

        info!(
            session_id = %self.session_id,
            document_id = %document_id,
            chunks_created,
            section_chunks = counts.section,
            contact_chunks = counts.contact,
            semantic_chunks = counts.semantic,
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

        // Both vector searches complete before anything is merged
        let (vector, contact) = tokio::join!(
            self.vector_search(query, top_k, &filter),
            self.contact_search(query, filters)
        );

        let fallback = if vector.len() + contact.len() < self.config.fallback_min_results {
            self.keyword_fallback(query, filters)
        } else {
            StrategyOutcome::Skipped
        };

        debug!(
            session_id = %self.session_id,
            vector_hits = vector.len(),
            contact_hits = contact.len(),
            fallback_hits = fallback.len(),
            "Sub-searches complete"
        );

        // Contact hits first so the boosted copy survives deduplication
        let mut candidates = contact.into_results(STRATEGY, "contact");
        candidates.extend(vector.into_results(STRATEGY, "vector"));
        candidates.extend(fallback.into_results(STRATEGY, "keyword_fallback"));

        let results = rank_and_truncate(
            dedup_by_prefix(candidates, self.config.dedup_prefix_chars),
            top_k,
        );

        record_search(watch.elapsed_secs(), STRATEGY, results.len());
        debug!(
            session_id = %self.session_id,
            result_count = results.len(),
            "Enhanced search complete"
        );

        results
    }

    fn stats(&self) -> IndexStats {
        self.counters.snapshot(
            STRATEGY,
            StrategyDetails::EnhancedSemantic {
                total_chunks: self.counts.total(),
                section_chunks: self.counts.section,
                contact_chunks: self.counts.contact,
                semantic_chunks: self.counts.semantic,
                raw_documents: self.documents.len(),
                embedding_model: self.store.embedding_model().to_string(),
                chunk_size: self.config.chunk_size,
                chunk_overlap: self.config.chunk_overlap,
            },
        )
    }

    async fn delete_session_data(&mut self) -> bool {
        let mut filter = Metadata::new();
        filter.insert(keys::SESSION_ID.to_string(), self.session_id.clone());

        match self.store.delete(&filter).await {
            Ok(removed) => {
                self.documents.clear();
                self.counts = TypeCounts::default();
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

#[cfg(test)]
mod tests {
    use super::*;
    use resumerag_common::embeddings::HashingEmbedder;
    use resumerag_common::vector_store::InMemoryVectorStore;

    const RESUME: &str = "Jane Roe\nEmail: jane.roe@example.com\nSKILLS\nPython, SQL";

    fn indexer() -> EnhancedSemanticIndexer {
        let store = Arc::new(InMemoryVectorStore::new(Arc::new(HashingEmbedder::new(256))));
        EnhancedSemanticIndexer::new("s1", Arc::new(IndexingConfig::default()), store).unwrap()
    }

    #[tokio::test]
    async fn test_index_counts_chunk_types() {
        let mut indexer = indexer();
        let outcome = indexer.index(RESUME, Metadata::new()).await.unwrap();

        match indexer.stats().details {
            StrategyDetails::EnhancedSemantic {
                total_chunks,
                section_chunks,
                contact_chunks,
                semantic_chunks,
                raw_documents,
                ..
            } => {
                assert_eq!(total_chunks, outcome.chunks_created);
                assert!(section_chunks >= 2);
                assert_eq!(contact_chunks, 1);
                assert!(semantic_chunks >= 1);
                assert_eq!(raw_documents, 1);
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_contact_search_skipped_without_trigger() {
        let mut indexer = indexer();
        indexer.index(RESUME, Metadata::new()).await.unwrap();

        let outcome = indexer.contact_search("python", &Metadata::new()).await;
        assert!(matches!(outcome, StrategyOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_contact_search_returns_contact_chunks() {
        let mut indexer = indexer();
        indexer.index(RESUME, Metadata::new()).await.unwrap();

        match indexer.contact_search("email", &Metadata::new()).await {
            StrategyOutcome::Completed(results) => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].chunk_type(), ChunkType::Contact);
                assert_eq!(
                    results[0].source_chunk.metadata[keys::EXTRACTED_VALUE],
                    "jane.roe@example.com"
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_keyword_fallback_windows_and_scores() {
        let mut indexer = indexer();
        indexer
            .index("Python here. Python there. Nothing else.", Metadata::new())
            .await
            .unwrap();

        match indexer.keyword_fallback("PYTHON missing", &Metadata::new()) {
            StrategyOutcome::Completed(results) => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].chunk_type(), ChunkType::Keyword);
                assert!((results[0].score - 0.2).abs() < 1e-6);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_keyword_fallback_folds_unicode_case() {
        let mut indexer = indexer();
        indexer
            .index("Jane Roe. ÉCOLE POLYTECHNIQUE graduate.", Metadata::new())
            .await
            .unwrap();

        match indexer.keyword_fallback("école", &Metadata::new()) {
            StrategyOutcome::Completed(results) => {
                assert_eq!(results.len(), 1);
                assert!(results[0].content.contains("ÉCOLE POLYTECHNIQUE"));
                assert!((results[0].score - 0.1).abs() < 1e-6);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_folded_text_maps_back_across_length_changes() {
        // 'İ' lowercases to two chars, three bytes instead of two
        let text = "İstanbul office";
        let folded = FoldedText::new(text);

        let (start, end) = folded.find("stanbul").unwrap();
        assert_eq!(&text[start..end], "stanbul");

        let (start, end) = folded.find("office").unwrap();
        assert_eq!(&text[start..end], "office");
        assert!(folded.find("paris").is_none());
    }

    #[tokio::test]
    async fn test_fallback_skipped_when_vector_hits_suffice() {
        let mut indexer = indexer();
        indexer.index(RESUME, Metadata::new()).await.unwrap();

        let filter = scoped_filter(&Metadata::new(), "s1");
        let vector = indexer.vector_search("python", 10, &filter).await;
        assert!(vector.len() >= indexer.config.fallback_min_results);

        let results = indexer.search("python", 10, &Metadata::new()).await;
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.chunk_type() != ChunkType::Keyword));
    }

    #[tokio::test]
    async fn test_keyword_fallback_honours_filters() {
        let mut indexer = indexer();
        let mut meta = Metadata::new();
        meta.insert("filename".into(), "cv.txt".into());
        indexer.index("Kubernetes operator", meta).await.unwrap();

        let mut other = Metadata::new();
        other.insert("filename".into(), "letter.txt".into());
        assert!(indexer.keyword_fallback("kubernetes", &other).is_empty());
    }

    #[tokio::test]
    async fn test_search_results_are_deduplicated() {
        let mut indexer = indexer();
        indexer.index(RESUME, Metadata::new()).await.unwrap();

        let results = indexer.search("email", 20, &Metadata::new()).await;
        let mut prefixes: Vec<String> = results
            .iter()
            .map(|r| r.content.chars().take(100).collect::<String>().trim().to_string())
            .collect();
        let before = prefixes.len();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), before);
    }

    #[tokio::test]
    async fn test_delete_resets_state() {
        let mut indexer = indexer();
        indexer.index(RESUME, Metadata::new()).await.unwrap();

        assert!(indexer.delete_session_data().await);
        assert!(indexer.search("python", 5, &Metadata::new()).await.is_empty());
        assert_eq!(indexer.stats().details.total_chunks(), 0);
        assert_eq!(indexer.stats().documents_indexed, 0);
    }
}
