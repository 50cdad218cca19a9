//! Result fusion for multi-strategy search
//!
//! Sub-searches report an explicit [`StrategyOutcome`]. Their results are
//! concatenated in priority order, deduplicated by content prefix
//! (first-seen wins) and ranked by score.

use resumerag_common::errors::AppError;
use resumerag_common::metrics::record_strategy_failure;
use resumerag_common::models::SearchResult;
use resumerag_ingestion::chunker::truncate_chars;
use std::collections::HashSet;
use tracing::{debug, warn};

/// What one sub-search produced
#[derive(Debug)]
pub enum StrategyOutcome {
    Completed(Vec<SearchResult>),
    /// Trigger condition not met
    Skipped,
    /// Adapter failure; contributes no results
    Failed(AppError),
}

impl StrategyOutcome {
    pub fn from_result(result: resumerag_common::Result<Vec<SearchResult>>) -> Self {
        match result {
            Ok(results) => StrategyOutcome::Completed(results),
            Err(e) => StrategyOutcome::Failed(e),
        }
    }

    /// Number of results contributed
    pub fn len(&self) -> usize {
        match self {
            StrategyOutcome::Completed(results) => results.len(),
            StrategyOutcome::Skipped | StrategyOutcome::Failed(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StrategyOutcome::Failed(_))
    }

    /// Unwrap into results, logging and counting a failure
    pub fn into_results(self, strategy: &str, sub_search: &str) -> Vec<SearchResult> {
        match self {
            StrategyOutcome::Completed(results) => results,
            StrategyOutcome::Skipped => {
                debug!(strategy, sub_search, "Sub-search skipped");
                Vec::new()
            }
            StrategyOutcome::Failed(e) => {
                warn!(
                    strategy,
                    sub_search,
                    error = %e,
                    "Sub-search failed, contributing no results"
                );
                record_strategy_failure(strategy, sub_search);
                Vec::new()
            }
        }
    }
}

/// Drop every result whose trimmed first `prefix_chars` characters equal
/// those of an earlier result
pub fn dedup_by_prefix(results: Vec<SearchResult>, prefix_chars: usize) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    results
        .into_iter()
        .filter(|result| {
            seen.insert(truncate_chars(&result.content, prefix_chars).trim().to_string())
        })
        .collect()
}

/// Stable descending sort by score, truncated to `top_k`
pub fn rank_and_truncate(mut results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);
    results
}
