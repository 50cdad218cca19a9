//! Error types for the ResumeRAG engine
//!
//! Provides a single error enum shared by every crate with:
//! - Distinct variants for configuration, adapter and chunking failures
//! - Machine-readable error codes for callers
//! - Retry classification for adapter failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,

    // Indexing errors (4xxx)
    ChunkingError,

    // External service errors (8xxx)
    VectorStoreError,
    EmbeddingError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,

            ErrorCode::ChunkingError => 4001,

            ErrorCode::VectorStoreError => 8001,
            ErrorCode::EmbeddingError => 8002,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Raised for unknown strategies and invalid settings. The only error
    /// meant to reach an end user as a hard failure.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Chunking error: {message}")]
    Chunking { message: String },

    #[error("Vector store error ({store}): {message}")]
    VectorStore { store: String, message: String },

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
        }
    }

    /// Build a vector store error tagged with the adapter name
    pub fn vector_store(store: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::VectorStore {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::Configuration { .. } | AppError::Config(_) => ErrorCode::ConfigurationError,
            AppError::Chunking { .. } => ErrorCode::ChunkingError,
            AppError::VectorStore { .. } => ErrorCode::VectorStoreError,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a caller may reasonably retry the failed call.
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::VectorStore { .. } | AppError::EmbeddingError { .. }
        )
    }

    /// Check if this error stems from configuration rather than runtime state
    pub fn is_configuration_error(&self) -> bool {
        self.code() == ErrorCode::ConfigurationError
    }
}
