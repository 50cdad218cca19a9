//! ResumeRAG Common Library
//!
//! Shared code for the ResumeRAG crates including:
//! - Chunk, search result and stats models
//! - Vector store and embedder contracts, with an in-process adapter
//! - Error types and handling
//! - Configuration management
//! - Metrics and tracing setup

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod telemetry;
pub mod vector_store;

// Re-export commonly used types
pub use config::{AppConfig, IndexingConfig};
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use models::{Chunk, ChunkType, IndexOutcome, IndexStats, Metadata, SearchResult};
pub use vector_store::{ScoredDocument, VectorStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
