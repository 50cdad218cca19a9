//! ResumeRAG Ingestion
//!
//! Chunking policies that turn document text into chunk candidates:
//! - Sentence packing for keyword indexing
//! - Recursive separator cascade for semantic indexing
//! - Resume section, contact and semantic passes for enhanced indexing

pub mod chunker;
pub mod resume;

pub use chunker::{
    ChunkCandidate, Chunker, RecursiveChunker, SentenceChunker, DEFAULT_SEPARATORS,
    RESUME_SEPARATORS,
};
pub use resume::ResumeChunker;
