//! Configuration management for the ResumeRAG engine
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values
//!
//! The loaded configuration is built once at startup and handed to the
//! indexer factory by reference; nothing reads it as ambient global state.

use crate::errors::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Chunking, BM25 and fusion parameters
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Strategy used by `IndexerFactory::create_default`
    #[serde(default = "default_strategy")]
    pub default_strategy: String,

    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum characters kept per detected resume section
    #[serde(default = "default_section_max_chars")]
    pub section_max_chars: usize,

    /// Number of leading lines treated as the resume header
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Characters of context kept on each side of a contact match
    #[serde(default = "default_contact_window")]
    pub contact_window: usize,

    /// Additive score boost for contact-filtered hits
    #[serde(default = "default_contact_boost")]
    pub contact_boost: f32,

    /// Number of hits requested from the contact-filtered search
    #[serde(default = "default_contact_top_k")]
    pub contact_top_k: usize,

    /// Characters of context kept on each side of a fallback keyword hit
    #[serde(default = "default_fallback_window")]
    pub fallback_window: usize,

    /// Fallback scan runs when vector searches return fewer results than this
    #[serde(default = "default_fallback_min_results")]
    pub fallback_min_results: usize,

    /// Per-occurrence score of a fallback keyword hit
    #[serde(default = "default_fallback_term_weight")]
    pub fallback_term_weight: f32,

    /// Prefix length compared during result deduplication
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,

    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,

    /// BM25 length-normalization strength
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: hashing
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model identifier reported in stats
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name attached to log lines
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_strategy() -> String { "semantic".to_string() }
fn default_chunk_size() -> usize { 800 }
fn default_chunk_overlap() -> usize { 100 }
fn default_section_max_chars() -> usize { 800 }
fn default_header_lines() -> usize { 5 }
fn default_contact_window() -> usize { 100 }
fn default_contact_boost() -> f32 { 0.1 }
fn default_contact_top_k() -> usize { 5 }
fn default_fallback_window() -> usize { 200 }
fn default_fallback_min_results() -> usize { 3 }
fn default_fallback_term_weight() -> f32 { 0.1 }
fn default_dedup_prefix_chars() -> usize { 100 }
fn default_bm25_k1() -> f32 { 1.5 }
fn default_bm25_b() -> f32 { 0.75 }
fn default_embedding_provider() -> String { "hashing".to_string() }
fn default_embedding_model() -> String { "feature-hashing-v1".to_string() }
fn default_embedding_dimension() -> usize { 384 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "resumerag".to_string() }

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            default_strategy: default_strategy(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            section_max_chars: default_section_max_chars(),
            header_lines: default_header_lines(),
            contact_window: default_contact_window(),
            contact_boost: default_contact_boost(),
            contact_top_k: default_contact_top_k(),
            fallback_window: default_fallback_window(),
            fallback_min_results: default_fallback_min_results(),
            fallback_term_weight: default_fallback_term_weight(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl IndexingConfig {
    /// Copy of the defaults with a different chunk size and overlap
    pub fn with_chunking(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    /// Reject settings the chunkers cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(AppError::configuration("indexing.chunk_size must be positive"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::configuration(format!(
                "indexing.chunk_overlap ({}) must be smaller than indexing.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.dedup_prefix_chars == 0 {
            return Err(AppError::configuration(
                "indexing.dedup_prefix_chars must be positive",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from `.env`, config files and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__INDEXING__CHUNK_SIZE=400
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        loaded.indexing.validate()?;
        Ok(loaded)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        loaded.indexing.validate()?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.indexing.default_strategy, "semantic");
        assert_eq!(config.indexing.chunk_size, 800);
        assert_eq!(config.indexing.chunk_overlap, 100);
        assert_eq!(config.indexing.bm25_k1, 1.5);
        assert_eq!(config.indexing.bm25_b, 0.75);
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn test_validate_rejects_overlap_larger_than_chunk() {
        let config = IndexingConfig::with_chunking(100, 100);
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = IndexingConfig::with_chunking(0, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_chunking_keeps_other_defaults() {
        let config = IndexingConfig::with_chunking(40, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.contact_window, 100);
        assert_eq!(config.fallback_min_results, 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::builder()
            .add_source(File::from_str(
                "[indexing]\nchunk_size = 400\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let loaded: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(loaded.indexing.chunk_size, 400);
        assert_eq!(loaded.indexing.chunk_overlap, 100);
        assert_eq!(loaded.observability.service_name, "resumerag");
    }
}
