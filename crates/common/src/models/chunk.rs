//! Chunk model and the metadata keys the engine attaches to it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Flat string map carried through ingestion, filters and adapter calls
pub type Metadata = HashMap<String, String>;

/// Metadata keys written by the engine on every chunk
pub mod keys {
    pub const SESSION_ID: &str = "session_id";
    pub const DOCUMENT_ID: &str = "document_id";
    pub const CHUNK_ID: &str = "chunk_id";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const CHUNK_TYPE: &str = "chunk_type";
    pub const SECTION: &str = "section";
    pub const INDEXED_AT: &str = "indexed_at";
    pub const EXTRACTED_VALUE: &str = "extracted_value";
}

/// How a chunk was produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// Resume section detected by heading heuristics
    Section,
    /// Window around an extracted contact value
    Contact,
    /// Output of the cascading separator splitter
    Semantic,
    /// Sentence-packed chunk or fallback keyword snippet
    Keyword,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Section => "section",
            ChunkType::Contact => "contact",
            ChunkType::Semantic => "semantic",
            ChunkType::Keyword => "keyword",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "section" => Ok(ChunkType::Section),
            "contact" => Ok(ChunkType::Contact),
            "semantic" => Ok(ChunkType::Semantic),
            "keyword" => Ok(ChunkType::Keyword),
            other => Err(format!("unknown chunk type: {}", other)),
        }
    }
}

/// A bounded span of document text, the retrievable unit.
///
/// Chunks are immutable once built. `chunk_index` is the ordinal inside
/// its document and is not unique across documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{document_id}_{chunk_index}`
    pub chunk_id: String,

    pub document_id: Uuid,

    pub session_id: String,

    pub content: String,

    pub chunk_index: usize,

    pub chunk_type: ChunkType,

    /// Section or contact kind the chunk was cut from
    pub section_tag: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Caller metadata plus the engine keys in [`keys`]
    pub metadata: Metadata,
}

impl Chunk {
    /// Build a chunk and stamp the engine metadata keys onto a copy of
    /// the caller's metadata. Engine keys win over caller keys.
    pub fn new(
        document_id: Uuid,
        session_id: &str,
        chunk_index: usize,
        content: String,
        chunk_type: ChunkType,
        section_tag: Option<String>,
        base_metadata: &Metadata,
    ) -> Self {
        let chunk_id = format!("{}_{}", document_id, chunk_index);
        let created_at = Utc::now();

        let mut metadata = base_metadata.clone();
        metadata.insert(keys::SESSION_ID.to_string(), session_id.to_string());
        metadata.insert(keys::DOCUMENT_ID.to_string(), document_id.to_string());
        metadata.insert(keys::CHUNK_ID.to_string(), chunk_id.clone());
        metadata.insert(keys::CHUNK_INDEX.to_string(), chunk_index.to_string());
        metadata.insert(keys::CHUNK_TYPE.to_string(), chunk_type.to_string());
        metadata.insert(
            keys::SECTION.to_string(),
            section_tag.clone().unwrap_or_else(|| "general".to_string()),
        );
        metadata.insert(keys::INDEXED_AT.to_string(), created_at.to_rfc3339());

        Self {
            chunk_id,
            document_id,
            session_id: session_id.to_string(),
            content,
            chunk_index,
            chunk_type,
            section_tag,
            created_at,
            metadata,
        }
    }

    /// Rebuild a chunk from content and metadata returned by a vector store.
    ///
    /// Missing or malformed keys fall back to neutral values rather than
    /// failing, since the adapter owns the stored representation.
    pub fn from_metadata(content: String, metadata: Metadata) -> Self {
        let get = |key: &str| metadata.get(key).map(String::as_str);

        let document_id = get(keys::DOCUMENT_ID)
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::nil);
        let chunk_index = get(keys::CHUNK_INDEX)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let chunk_type = get(keys::CHUNK_TYPE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(ChunkType::Semantic);
        let created_at = get(keys::INDEXED_AT)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Self {
            chunk_id: get(keys::CHUNK_ID)
                .map(String::from)
                .unwrap_or_else(|| format!("{}_{}", document_id, chunk_index)),
            document_id,
            session_id: get(keys::SESSION_ID).unwrap_or_default().to_string(),
            section_tag: get(keys::SECTION).map(String::from),
            content,
            chunk_index,
            chunk_type,
            created_at,
            metadata,
        }
    }

    /// True when every filter key is present with an equal value
    pub fn matches(&self, filters: &Metadata) -> bool {
        filters
            .iter()
            .all(|(key, value)| self.metadata.get(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_keys_override_caller_metadata() {
        let mut base = Metadata::new();
        base.insert("session_id".into(), "forged".into());
        base.insert("filename".into(), "cv.pdf".into());

        let doc = Uuid::new_v4();
        let chunk = Chunk::new(
            doc,
            "s-1",
            2,
            "text".into(),
            ChunkType::Contact,
            Some("email".into()),
            &base,
        );

        assert_eq!(chunk.metadata["session_id"], "s-1");
        assert_eq!(chunk.metadata["filename"], "cv.pdf");
        assert_eq!(chunk.metadata["chunk_type"], "contact");
        assert_eq!(chunk.metadata["section"], "email");
        assert_eq!(chunk.chunk_id, format!("{}_2", doc));
    }

    #[test]
    fn test_metadata_roundtrip_through_adapter() {
        let doc = Uuid::new_v4();
        let original = Chunk::new(
            doc,
            "s-1",
            4,
            "Python, SQL".into(),
            ChunkType::Section,
            Some("skills".into()),
            &Metadata::new(),
        );

        let rebuilt = Chunk::from_metadata(original.content.clone(), original.metadata.clone());
        assert_eq!(rebuilt.document_id, doc);
        assert_eq!(rebuilt.session_id, "s-1");
        assert_eq!(rebuilt.chunk_index, 4);
        assert_eq!(rebuilt.chunk_type, ChunkType::Section);
        assert_eq!(rebuilt.section_tag.as_deref(), Some("skills"));
        assert_eq!(rebuilt.chunk_id, original.chunk_id);
    }

    #[test]
    fn test_matches_requires_every_filter() {
        let chunk = Chunk::new(
            Uuid::new_v4(),
            "s-1",
            0,
            "x".into(),
            ChunkType::Keyword,
            None,
            &Metadata::new(),
        );

        let mut filters = Metadata::new();
        assert!(chunk.matches(&filters));

        filters.insert("chunk_type".into(), "keyword".into());
        assert!(chunk.matches(&filters));

        filters.insert("session_id".into(), "s-2".into());
        assert!(!chunk.matches(&filters));
    }

    #[test]
    fn test_chunk_type_parse() {
        assert_eq!("contact".parse::<ChunkType>(), Ok(ChunkType::Contact));
        assert!("table".parse::<ChunkType>().is_err());
    }
}
