//! Term statistics for BM25 ranking
//!
//! Keeps per-chunk term frequencies and lengths in ingestion order, plus the
//! collection-wide document frequencies. Document frequency is rebuilt from
//! the surviving chunks after any removal, never patched incrementally.

use std::collections::HashMap;

/// BM25 tuning parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

#[derive(Debug, Clone, Default)]
struct TermEntry {
    term_frequencies: HashMap<String, usize>,
    length: usize,
}

/// Term frequency and document frequency tables
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    entries: Vec<TermEntry>,
    document_frequency: HashMap<String, usize>,
    average_length: f32,
}

impl TermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk's tokens. Call [`TermIndex::refresh_average`] once
    /// the ingestion batch is complete.
    pub fn insert(&mut self, tokens: &[String]) {
        let mut term_frequencies: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *term_frequencies.entry(token.clone()).or_insert(0) += 1;
        }

        for term in term_frequencies.keys() {
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
        }

        self.entries.push(TermEntry {
            term_frequencies,
            length: tokens.len(),
        });
    }

    /// Recompute the mean chunk length in tokens
    pub fn refresh_average(&mut self) {
        self.average_length = if self.entries.is_empty() {
            0.0
        } else {
            let total: usize = self.entries.iter().map(|e| e.length).sum();
            total as f32 / self.entries.len() as f32
        };
    }

    /// Keep only the entries whose position satisfies `keep`, then rebuild
    /// document frequency and average length from the survivors
    pub fn retain_positions(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut position = 0;
        self.entries.retain(|_| {
            let kept = keep(position);
            position += 1;
            kept
        });

        self.document_frequency.clear();
        for entry in &self.entries {
            for term in entry.term_frequencies.keys() {
                *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        self.refresh_average();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// BM25 score of the entry at `position` for the query terms.
    ///
    /// Uses the non-negative IDF `ln(1 + (N - df + 0.5) / (df + 0.5))` so a
    /// term present in most chunks still contributes a small positive weight.
    /// Terms absent from the collection contribute nothing.
    pub fn score(&self, position: usize, query_terms: &[String], params: Bm25Params) -> f32 {
        let Some(entry) = self.entries.get(position) else {
            return 0.0;
        };

        let n = self.entries.len() as f32;
        let length_ratio = if self.average_length > 0.0 {
            entry.length as f32 / self.average_length
        } else {
            1.0
        };

        let mut score = 0.0;
        for term in query_terms {
            let df = self.document_frequency(term);
            if df == 0 {
                continue;
            }

            let tf = entry.term_frequencies.get(term).copied().unwrap_or(0) as f32;
            if tf == 0.0 {
                continue;
            }

            let df = df as f32;
            let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
            let norm = tf + params.k1 * (1.0 - params.b + params.b * length_ratio);
            score += idf * tf * (params.k1 + 1.0) / norm;
        }

        score
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn unique_terms(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn average_length(&self) -> f32 {
        self.average_length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
