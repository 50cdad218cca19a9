//! Text chunking module
//!
//! Splits document text into chunk candidates. Two general-purpose
//! policies live here:
//! - [`SentenceChunker`]: packs whole sentences up to a character budget
//! - [`RecursiveChunker`]: cascades through separators, largest first,
//!   and merges the pieces back up to the budget with overlap
//!
//! Sizes are counted in characters, not bytes.

use resumerag_common::config::IndexingConfig;
use resumerag_common::models::ChunkType;
use tracing::debug;

/// Paragraph, line, sentence, clause, word, then raw characters
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", "; ", ": ", " ", ""];

/// Resume-tuned cascade: section breaks first and comma-separated lists
/// before falling back to words
pub const RESUME_SEPARATORS: &[&str] = &[
    "\n\n\n", "\n\n", "\n", ". ", "! ", "? ", "; ", ": ", ", ", " ", "",
];

/// A chunk before it is stamped with ids and session metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    pub content: String,
    pub chunk_type: ChunkType,
    /// Section name or contact kind
    pub section_tag: Option<String>,
    /// Matched value for contact chunks
    pub extracted_value: Option<String>,
}

impl ChunkCandidate {
    pub fn new(content: impl Into<String>, chunk_type: ChunkType) -> Self {
        Self {
            content: content.into(),
            chunk_type,
            section_tag: None,
            extracted_value: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section_tag = Some(section.into());
        self
    }

    pub fn with_extracted_value(mut self, value: impl Into<String>) -> Self {
        self.extracted_value = Some(value.into());
        self
    }
}

/// Common trait for all chunking policies
pub trait Chunker: Send + Sync {
    /// Split text into candidates, in document order
    fn chunk(&self, text: &str) -> Vec<ChunkCandidate>;

    /// Policy name for logs
    fn name(&self) -> &'static str;
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Slice of `text` spanning `radius` characters either side of the byte
/// range `start..end`, clamped to the text bounds.
///
/// `start` and `end` must lie on char boundaries.
pub fn window_around(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(idx, _)| end + idx)
        .unwrap_or(text.len());
    &text[from..to]
}

// ============================================================================
// Sentence packing
// ============================================================================

/// Greedy sentence packer used by the keyword strategy.
///
/// Splits on runs of `.`, `!` and `?`, then appends sentences to the
/// current chunk while the result stays under `chunk_size` characters.
/// Input without any sentence text becomes a single chunk.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
}

impl SentenceChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn from_config(config: &IndexingConfig) -> Self {
        Self::new(config.chunk_size)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for sentence in text
            .split(|c: char| matches!(c, '.' | '!' | '?'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let sentence_len = char_len(sentence);

            if current_len + sentence_len < self.chunk_size {
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(sentence);
                current_len += sentence_len;
            } else {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push_str(sentence);
                current_len = sentence_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        if chunks.is_empty() {
            chunks.push(text.to_string());
        }

        chunks
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Vec<ChunkCandidate> {
        self.split_text(text)
            .into_iter()
            .map(|content| ChunkCandidate::new(content, ChunkType::Keyword))
            .collect()
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}

// ============================================================================
// Recursive separator cascade
// ============================================================================

/// Cascading-separator splitter.
///
/// Splits on the first separator present in the text, keeps pieces that fit
/// the budget, recurses into oversized pieces with the remaining separators,
/// then merges neighbouring pieces back into chunks of at most `chunk_size`
/// characters carrying up to `chunk_overlap` characters forward.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &[&'static str]) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: separators.to_vec(),
        }
    }

    pub fn from_config(config: &IndexingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, DEFAULT_SEPARATORS)
    }

    pub fn resume(config: &IndexingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, RESUME_SEPARATORS)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chunks = self.split_recursive(text, &self.separators);

        debug!(
            input_len = text.len(),
            chunk_count = chunks.len(),
            chunk_size = self.chunk_size,
            "Text chunked"
        );

        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge_pieces(&fitting));
                fitting.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge_pieces(&fitting));
        }

        chunks
    }

    /// Pack pieces into chunks, sliding a window that keeps at most
    /// `chunk_overlap` trailing characters when a chunk closes
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: std::collections::VecDeque<(&str, usize)> = Default::default();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<ChunkCandidate> {
        self.split_text(text)
            .into_iter()
            .map(|content| {
                ChunkCandidate::new(content, ChunkType::Semantic).with_section("general")
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &std::collections::VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split after every separator occurrence so no text is lost; an empty
/// separator yields single characters
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(idx, c)| &text[idx..idx + c.len_utf8()])
            .collect();
    }
    text.split_inclusive(separator).collect()
}
