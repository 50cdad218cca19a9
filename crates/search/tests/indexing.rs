//! End-to-end indexing and retrieval tests across all strategies

use async_trait::async_trait;
use resumerag_common::config::IndexingConfig;
use resumerag_common::embeddings::HashingEmbedder;
use resumerag_common::errors::{AppError, Result};
use resumerag_common::models::{ChunkType, Metadata};
use resumerag_common::vector_store::{InMemoryVectorStore, ScoredDocument, VectorStore};
use resumerag_search::{IndexerContext, IndexerFactory};
use std::sync::Arc;

const RESUME: &str = "Jane Roe\nEmail: jane.roe@example.com\nSKILLS\nPython, SQL";

fn memory_store() -> Arc<InMemoryVectorStore> {
    Arc::new(InMemoryVectorStore::new(Arc::new(HashingEmbedder::new(384))))
}

fn factory_with(config: IndexingConfig, store: Arc<dyn VectorStore>) -> IndexerFactory {
    IndexerFactory::new(IndexerContext::new(Arc::new(config), store))
}

fn factory() -> IndexerFactory {
    factory_with(IndexingConfig::default(), memory_store())
}

/// Adapter that fails every call
struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn add_texts(&self, _texts: &[String], _metadatas: &[Metadata]) -> Result<()> {
        Err(AppError::vector_store("failing", "connection refused"))
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
        _filter: &Metadata,
    ) -> Result<Vec<ScoredDocument>> {
        Err(AppError::vector_store("failing", "connection refused"))
    }

    async fn delete(&self, _filter: &Metadata) -> Result<usize> {
        Err(AppError::vector_store("failing", "connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn embedding_model(&self) -> &str {
        "none"
    }
}

/// Adapter that stores and deletes normally but fails every search
struct SearchFailingStore {
    inner: InMemoryVectorStore,
}

impl SearchFailingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryVectorStore::new(Arc::new(HashingEmbedder::new(64))),
        }
    }
}

#[async_trait]
impl VectorStore for SearchFailingStore {
    async fn add_texts(&self, texts: &[String], metadatas: &[Metadata]) -> Result<()> {
        self.inner.add_texts(texts, metadatas).await
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
        _filter: &Metadata,
    ) -> Result<Vec<ScoredDocument>> {
        Err(AppError::vector_store("search-failing", "query timed out"))
    }

    async fn delete(&self, filter: &Metadata) -> Result<usize> {
        self.inner.delete(filter).await
    }

    fn name(&self) -> &str {
        "search-failing"
    }

    fn embedding_model(&self) -> &str {
        self.inner.embedding_model()
    }
}

#[tokio::test]
async fn contact_query_surfaces_boosted_contact_chunk() {
    let store = memory_store();
    let factory = factory_with(IndexingConfig::default(), store.clone());
    let mut indexer = factory.create("enhanced_semantic", "session-a").unwrap();
    indexer.index(RESUME, Metadata::new()).await.unwrap();

    let results = indexer.search("email", 10, &Metadata::new()).await;
    let contact = results
        .iter()
        .find(|r| {
            r.chunk_type() == ChunkType::Contact && r.content.contains("jane.roe@example.com")
        })
        .expect("contact chunk in results");

    // Unboosted similarity of the same contact chunk
    let mut filter = Metadata::new();
    filter.insert("session_id".into(), "session-a".into());
    filter.insert("chunk_type".into(), "contact".into());
    let raw = store
        .similarity_search_with_score("email", 1, &filter)
        .await
        .unwrap();

    assert_eq!(raw[0].content, contact.content);
    assert!(contact.score > raw[0].score);
}

#[tokio::test]
async fn keyword_search_ranks_matching_sentence_first() {
    let factory = factory_with(IndexingConfig::with_chunking(20, 0), memory_store());
    let mut indexer = factory.create("keyword", "session-b").unwrap();

    let outcome = indexer
        .index("Python is great. SQL is also great.", Metadata::new())
        .await
        .unwrap();
    assert_eq!(outcome.chunks_created, 2);

    let results = indexer.search("Python", 5, &Metadata::new()).await;
    assert!(!results.is_empty());
    assert!(results[0].content.contains("Python"));
    for other in &results[1..] {
        assert!(results[0].score > other.score);
    }
}

#[tokio::test]
async fn unknown_strategy_is_configuration_error() {
    let err = factory().create("unknown-strategy", "s").err().unwrap();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("keyword"));
    assert!(err.to_string().contains("enhanced_semantic"));
}

#[tokio::test]
async fn deleting_empty_indexer_succeeds() {
    let factory = factory();
    for name in ["keyword", "semantic", "enhanced_semantic"] {
        let mut indexer = factory.create(name, "session-d").unwrap();
        assert!(indexer.delete_session_data().await);

        let stats = indexer.stats();
        assert_eq!(stats.documents_indexed, 0);
        assert_eq!(stats.chunks_created, 0);
        assert_eq!(stats.details.total_chunks(), 0);
        assert!(stats.last_updated.is_none());
    }
}

#[tokio::test]
async fn forged_session_filter_never_leaks_other_sessions() {
    let factory = factory();

    for name in ["keyword", "semantic", "enhanced_semantic"] {
        let mut mine = factory.create(name, &format!("{}-mine", name)).unwrap();
        let mut theirs = factory.create(name, &format!("{}-theirs", name)).unwrap();

        mine.index("Rust engineer at Acme.", Metadata::new()).await.unwrap();
        theirs.index("Rust engineer at Globex.", Metadata::new()).await.unwrap();

        let mut forged = Metadata::new();
        forged.insert("session_id".into(), format!("{}-theirs", name));

        let results = mine.search("rust engineer", 10, &forged).await;
        assert!(!results.is_empty(), "{} returned nothing", name);
        assert!(results.iter().all(|r| r.session_id() == mine.session_id()));
    }
}

#[tokio::test]
async fn search_is_empty_after_delete_for_every_strategy() {
    let factory = factory();

    for name in ["keyword", "semantic", "enhanced_semantic"] {
        let mut indexer = factory.create(name, "session-e").unwrap();
        indexer.index(RESUME, Metadata::new()).await.unwrap();
        assert!(!indexer.search("python", 5, &Metadata::new()).await.is_empty());

        assert!(indexer.delete_session_data().await);
        assert!(indexer.search("python", 5, &Metadata::new()).await.is_empty());
    }
}

#[tokio::test]
async fn caller_metadata_reaches_every_chunk() {
    let factory = factory();
    let mut indexer = factory.create("enhanced_semantic", "session-f").unwrap();

    let mut metadata = Metadata::new();
    metadata.insert("filename".into(), "jane.pdf".into());
    indexer.index(RESUME, metadata).await.unwrap();

    let results = indexer.search("python sql", 20, &Metadata::new()).await;
    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(result.source_chunk.metadata["filename"], "jane.pdf");
        assert_eq!(result.source_chunk.metadata["session_id"], "session-f");
    }
}

#[tokio::test]
async fn ingestion_failure_leaves_stats_untouched() {
    let factory = factory_with(IndexingConfig::default(), Arc::new(FailingVectorStore));

    for name in ["semantic", "enhanced_semantic"] {
        let mut indexer = factory.create(name, "session-g").unwrap();
        let err = indexer.index(RESUME, Metadata::new()).await.unwrap_err();

        assert!(matches!(err, AppError::VectorStore { .. }));
        assert_eq!(indexer.stats().documents_indexed, 0);
        assert_eq!(indexer.stats().details.total_chunks(), 0);
    }
}

#[tokio::test]
async fn search_failure_degrades_to_empty() {
    let factory = factory_with(IndexingConfig::default(), Arc::new(FailingVectorStore));

    for name in ["semantic", "enhanced_semantic"] {
        let indexer = factory.create(name, "session-h").unwrap();
        assert!(indexer.search("email", 5, &Metadata::new()).await.is_empty());
    }
}

#[tokio::test]
async fn delete_failure_returns_false() {
    let factory = factory_with(IndexingConfig::default(), Arc::new(FailingVectorStore));

    for name in ["semantic", "enhanced_semantic"] {
        let mut indexer = factory.create(name, "session-i").unwrap();
        assert!(!indexer.delete_session_data().await);
    }
}

#[tokio::test]
async fn top_k_zero_returns_nothing() {
    let factory = factory();

    for name in ["keyword", "semantic", "enhanced_semantic"] {
        let mut indexer = factory.create(name, "session-j").unwrap();
        indexer.index(RESUME, Metadata::new()).await.unwrap();
        assert!(indexer.search("python", 0, &Metadata::new()).await.is_empty());
    }
}

#[tokio::test]
async fn results_never_exceed_top_k() {
    let factory = factory();
    let mut indexer = factory.create("enhanced_semantic", "session-k").unwrap();
    indexer.index(RESUME, Metadata::new()).await.unwrap();

    let results = indexer.search("email name phone", 2, &Metadata::new()).await;
    assert!(results.len() <= 2);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn failed_vector_search_still_returns_fallback_snippet() {
    let factory = factory_with(IndexingConfig::default(), Arc::new(SearchFailingStore::new()));
    let mut indexer = factory.create("enhanced_semantic", "session-l").unwrap();
    indexer
        .index("Platform engineer running Kubernetes clusters.", Metadata::new())
        .await
        .unwrap();

    let results = indexer.search("kubernetes", 5, &Metadata::new()).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk_type(), ChunkType::Keyword);
    assert!(results[0].content.contains("Kubernetes"));
    assert_eq!(results[0].session_id(), "session-l");
}

#[tokio::test]
async fn enough_vector_hits_suppress_keyword_fallback() {
    let factory = factory();
    let mut indexer = factory.create("enhanced_semantic", "session-m").unwrap();
    let outcome = indexer.index(RESUME, Metadata::new()).await.unwrap();
    assert!(outcome.chunks_created >= IndexingConfig::default().fallback_min_results);

    let results = indexer.search("python", 10, &Metadata::new()).await;
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.chunk_type() != ChunkType::Keyword));
}
