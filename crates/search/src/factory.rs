//! Indexer factory
//!
//! Maps strategy names to constructors. The registry and its shared
//! dependencies are built once and injected; nothing here is global.

use crate::retrieval::{EnhancedSemanticIndexer, Indexer, KeywordIndexer, SemanticIndexer};
use resumerag_common::config::IndexingConfig;
use resumerag_common::errors::{AppError, Result};
use resumerag_common::vector_store::VectorStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared dependencies handed to every constructor
#[derive(Clone)]
pub struct IndexerContext {
    pub config: Arc<IndexingConfig>,
    pub vector_store: Arc<dyn VectorStore>,
}

impl IndexerContext {
    pub fn new(config: Arc<IndexingConfig>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            config,
            vector_store,
        }
    }
}

type Constructor = fn(&IndexerContext, &str) -> Result<Box<dyn Indexer>>;

struct Registration {
    description: &'static str,
    constructor: Constructor,
}

/// Name and description of a registered strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

/// Registry of indexing strategies
pub struct IndexerFactory {
    context: IndexerContext,
    registry: BTreeMap<&'static str, Registration>,
}

impl IndexerFactory {
    /// Build the factory with the built-in strategies registered
    pub fn new(context: IndexerContext) -> Self {
        let mut registry = BTreeMap::new();

        registry.insert(
            "keyword",
            Registration {
                description: "Sentence-packed chunks ranked with BM25",
                constructor: keyword_indexer,
            },
        );
        registry.insert(
            "semantic",
            Registration {
                description: "Recursive chunks ranked by vector similarity",
                constructor: semantic_indexer,
            },
        );
        registry.insert(
            "enhanced_semantic",
            Registration {
                description:
                    "Resume section, contact and semantic chunks with fused multi-strategy search",
                constructor: enhanced_semantic_indexer,
            },
        );

        Self { context, registry }
    }

    /// Create an indexer for `session_id`. The strategy name is trimmed and
    /// matched case-insensitively.
    pub fn create(&self, strategy: &str, session_id: &str) -> Result<Box<dyn Indexer>> {
        let name = strategy.trim().to_lowercase();

        let Some(registration) = self.registry.get(name.as_str()) else {
            let available = self.registry.keys().copied().collect::<Vec<_>>().join(", ");
            warn!(strategy = %strategy, available = %available, "Unknown indexing strategy");
            return Err(AppError::configuration(format!(
                "unknown indexing strategy '{}', available strategies: {}",
                strategy, available
            )));
        };

        debug!(strategy = %name, session_id = %session_id, "Creating indexer");
        (registration.constructor)(&self.context, session_id)
    }

    /// Create an indexer with the configured default strategy
    pub fn create_default(&self, session_id: &str) -> Result<Box<dyn Indexer>> {
        self.create(&self.context.config.default_strategy, session_id)
    }

    /// Registered strategies, sorted by name
    pub fn list_strategies(&self) -> Vec<StrategyInfo> {
        self.registry
            .iter()
            .map(|(name, registration)| StrategyInfo {
                name: name.to_string(),
                description: registration.description.to_string(),
            })
            .collect()
    }
}

fn keyword_indexer(ctx: &IndexerContext, session_id: &str) -> Result<Box<dyn Indexer>> {
    Ok(Box::new(KeywordIndexer::new(session_id, ctx.config.clone())))
}

fn semantic_indexer(ctx: &IndexerContext, session_id: &str) -> Result<Box<dyn Indexer>> {
    Ok(Box::new(SemanticIndexer::new(
        session_id,
        ctx.config.clone(),
        ctx.vector_store.clone(),
    )))
}

fn enhanced_semantic_indexer(ctx: &IndexerContext, session_id: &str) -> Result<Box<dyn Indexer>> {
    let indexer = EnhancedSemanticIndexer::new(
        session_id,
        ctx.config.clone(),
        ctx.vector_store.clone(),
    )?;
    Ok(Box::new(indexer))
}
