//! Resume-aware multi-pass chunking
//!
//! Produces three kinds of candidates from one resume, in this order:
//! 1. Section chunks: header lines plus keyword-delimited blocks
//! 2. Contact chunks: text windows around emails, phones and profile URLs
//! 3. Semantic chunks: the resume separator cascade over the full text

use crate::chunker::{truncate_chars, window_around, ChunkCandidate, Chunker, RecursiveChunker};
use regex_lite::Regex;
use resumerag_common::config::IndexingConfig;
use resumerag_common::errors::{AppError, Result};
use resumerag_common::models::ChunkType;
use tracing::debug;

/// Section heading keywords and the keywords that close the block.
/// An empty stop list runs the block to the end of the text.
const SECTION_RULES: &[(&str, &str, &str)] = &[
    ("contact", "email|phone|address|linkedin|github", ""),
    ("experience", "experience|employment|work history", "education|skills"),
    ("education", "education|academic|degree|university|college", "experience|skills"),
    ("skills", "skills|technical|competencies|technologies", "experience|education"),
    ("summary", "summary|objective|profile", "experience|education|skills"),
];

const CONTACT_PATTERNS: &[(&str, &str)] = &[
    ("email", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
    ("phone", r"(\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}"),
    ("linkedin", r"linkedin\.com/in/[a-zA-Z0-9-]+"),
    ("github", r"github\.com/[a-zA-Z0-9_-]+"),
    ("website", r"https?://[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(?:/[^\s]*)?"),
];

struct SectionRule {
    name: &'static str,
    start: Regex,
    stop: Option<Regex>,
}

/// Multi-pass chunker for resumes
pub struct ResumeChunker {
    sections: Vec<SectionRule>,
    contacts: Vec<(&'static str, Regex)>,
    splitter: RecursiveChunker,
    header_lines: usize,
    section_max_chars: usize,
    contact_window: usize,
}

impl ResumeChunker {
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        let sections = SECTION_RULES
            .iter()
            .map(|(name, start, stop)| {
                Ok(SectionRule {
                    name: *name,
                    start: compile(&format!("(?i){}", start))?,
                    stop: if stop.is_empty() {
                        None
                    } else {
                        Some(compile(&format!("(?i){}", stop))?)
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let contacts = CONTACT_PATTERNS
            .iter()
            .map(|(kind, pattern)| Ok((*kind, compile(&format!("(?i){}", pattern))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sections,
            contacts,
            splitter: RecursiveChunker::resume(config),
            header_lines: config.header_lines,
            section_max_chars: config.section_max_chars,
            contact_window: config.contact_window,
        })
    }

    /// Header plus every detected section, capped in length
    pub fn section_chunks(&self, text: &str) -> Vec<ChunkCandidate> {
        let mut candidates = Vec::new();

        let header = text
            .split('\n')
            .take(self.header_lines)
            .collect::<Vec<_>>()
            .join("\n");
        if !header.trim().is_empty() {
            let content = truncate_chars(&header, self.section_max_chars);
            candidates.push(
                ChunkCandidate::new(content, ChunkType::Section).with_section("header"),
            );
        }

        for rule in &self.sections {
            let Some(found) = rule.start.find(text) else {
                continue;
            };

            let rest = &text[found.end()..];
            let end = rule
                .stop
                .as_ref()
                .and_then(|stop| stop.find(rest))
                .map(|m| found.end() + m.start())
                .unwrap_or(text.len());

            let block = truncate_chars(&text[found.start()..end], self.section_max_chars);
            if block.trim().is_empty() {
                continue;
            }

            candidates.push(ChunkCandidate::new(block, ChunkType::Section).with_section(rule.name));
        }

        candidates
    }

    /// One chunk per contact match, windowed around the match
    pub fn contact_chunks(&self, text: &str) -> Vec<ChunkCandidate> {
        let mut candidates = Vec::new();

        for (kind, pattern) in &self.contacts {
            for found in pattern.find_iter(text) {
                let context =
                    window_around(text, found.start(), found.end(), self.contact_window).trim();
                if context.is_empty() {
                    continue;
                }

                candidates.push(
                    ChunkCandidate::new(context, ChunkType::Contact)
                        .with_section(*kind)
                        .with_extracted_value(found.as_str()),
                );
            }
        }

        candidates
    }
}

impl Chunker for ResumeChunker {
    fn chunk(&self, text: &str) -> Vec<ChunkCandidate> {
        let mut candidates = self.section_chunks(text);
        let section_count = candidates.len();

        candidates.extend(self.contact_chunks(text));
        let contact_count = candidates.len() - section_count;

        candidates.extend(self.splitter.chunk(text));

        debug!(
            section_chunks = section_count,
            contact_chunks = contact_count,
            semantic_chunks = candidates.len() - section_count - contact_count,
            "Resume chunked"
        );

        candidates
    }

    fn name(&self) -> &'static str {
        "resume"
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Chunking {
        message: format!("invalid pattern {}: {}", pattern, e),
    })
}
