//! Session-scoped indexers
//!
//! Provides three indexing strategies behind one trait:
//! - Keyword indexing (sentence chunks ranked with BM25)
//! - Semantic indexing (recursive chunks in a vector store)
//! - Enhanced semantic indexing (resume-aware chunks, fused multi-search)

mod bm25;
mod fusion;
mod hybrid;
mod terms;
mod vector;

pub use bm25::KeywordIndexer;
pub use fusion::{dedup_by_prefix, rank_and_truncate, StrategyOutcome};
pub use hybrid::EnhancedSemanticIndexer;
pub use terms::{Bm25Params, TermIndex};
pub use vector::SemanticIndexer;

use async_trait::async_trait;
use resumerag_common::errors::{AppError, Result};
use resumerag_common::models::{keys, Chunk, IndexOutcome, IndexStats, Metadata, SearchResult};
use resumerag_common::vector_store::ScoredDocument;

/// Common trait for all indexing strategies.
///
/// One instance owns one session. `index` and `delete_session_data` need
/// exclusive access; `search` and `stats` may run concurrently. Callers that
/// ingest and search at the same time wrap the indexer in a
/// `tokio::sync::RwLock`.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Chunk and index one document. `metadata` is attached to every chunk.
    async fn index(&mut self, text: &str, metadata: Metadata) -> Result<IndexOutcome>;

    /// Best-first results for `query`, at most `top_k`. Never fails; a
    /// strategy that cannot answer returns an empty list.
    async fn search(&self, query: &str, top_k: usize, filters: &Metadata) -> Vec<SearchResult>;

    /// Snapshot of the counters and strategy details
    fn stats(&self) -> IndexStats;

    /// Remove everything this indexer holds and reset its stats.
    /// Returns false if the removal failed.
    async fn delete_session_data(&mut self) -> bool;

    /// Registered strategy name
    fn strategy(&self) -> &'static str;

    fn session_id(&self) -> &str;
}

/// Lowercase and split into maximal runs of word characters
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Caller filters with the session inserted last so it can never be
/// overridden by a caller-supplied `session_id`
pub fn scoped_filter(filters: &Metadata, session_id: &str) -> Metadata {
    let mut filter = filters.clone();
    filter.insert(keys::SESSION_ID.to_string(), session_id.to_string());
    filter
}

/// Reject documents with nothing to index
pub(crate) fn ensure_document(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation {
            message: "document text is empty".to_string(),
            field: Some("document_text".to_string()),
        });
    }
    Ok(())
}

/// Convert adapter matches into results, dropping anything that does not
/// belong to `session_id`
pub(crate) fn into_session_results(
    documents: Vec<ScoredDocument>,
    session_id: &str,
    boost: f32,
) -> Vec<SearchResult> {
    documents
        .into_iter()
        .map(|doc| {
            let chunk = Chunk::from_metadata(doc.content, doc.metadata);
            SearchResult::from_chunk(chunk, doc.score + boost)
        })
        .filter(|result| result.session_id() == session_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_word_runs() {
        assert_eq!(
            tokenize("Rust, C++ and snake_case! v2.0"),
            vec!["rust", "c", "and", "snake_case", "v2", "0"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize(" ... ").is_empty());
    }

    #[test]
    fn test_scoped_filter_overrides_forged_session() {
        let mut filters = Metadata::new();
        filters.insert("session_id".into(), "other".into());
        filters.insert("section".into(), "skills".into());

        let scoped = scoped_filter(&filters, "mine");
        assert_eq!(scoped["session_id"], "mine");
        assert_eq!(scoped["section"], "skills");
    }

    #[test]
    fn test_into_session_results_drops_foreign_sessions() {
        let mut own = Metadata::new();
        own.insert("session_id".into(), "s1".into());
        let mut foreign = Metadata::new();
        foreign.insert("session_id".into(), "s2".into());

        let docs = vec![
            ScoredDocument { content: "a".into(), score: 0.5, metadata: own },
            ScoredDocument { content: "b".into(), score: 0.9, metadata: foreign },
        ];

        let results = into_session_results(docs, "s1", 0.1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "a");
        assert!((results[0].score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ensure_document_rejects_blank() {
        assert!(ensure_document("  \n").is_err());
        assert!(ensure_document("Jane").is_ok());
    }
}
