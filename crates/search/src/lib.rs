//! ResumeRAG Search
//!
//! Session-scoped indexers over resume text:
//! - Keyword indexing with BM25 ranking
//! - Semantic indexing through a vector store adapter
//! - Enhanced semantic indexing with fused contact, vector and keyword searches
//!
//! Indexers are created by name through [`IndexerFactory`].

pub mod factory;
pub mod retrieval;

pub use factory::{IndexerContext, IndexerFactory, StrategyInfo};
pub use retrieval::{
    EnhancedSemanticIndexer, Indexer, KeywordIndexer, SemanticIndexer, StrategyOutcome,
};
