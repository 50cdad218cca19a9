//! Metrics helpers
//!
//! Thin wrappers over the `metrics` facade with standardized naming.
//! Nothing is exported unless the host process installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ResumeRAG metrics
pub const METRICS_PREFIX: &str = "resumerag";

/// Register all metric descriptions
pub fn register_metrics() {
    // Ingestion metrics
    describe_counter!(
        format!("{}_documents_indexed_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents indexed"
    );

    describe_counter!(
        format!("{}_chunks_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks created"
    );

    describe_histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Search latency in seconds"
    );

    describe_counter!(
        format!("{}_strategy_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Sub-search strategies that failed and contributed no results"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time an operation started now
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Helper to record ingestion metrics
pub fn record_ingestion(duration_secs: f64, strategy: &str, chunks_created: usize) {
    counter!(
        format!("{}_documents_indexed_total", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .increment(1);

    counter!(
        format!("{}_chunks_created_total", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .increment(chunks_created as u64);

    histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .record(duration_secs);
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, strategy: &str, result_count: usize) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "strategy" => strategy.to_string(),
        "empty" => (result_count == 0).to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a degraded sub-search
pub fn record_strategy_failure(strategy: &str, sub_search: &str) {
    counter!(
        format!("{}_strategy_failures_total", METRICS_PREFIX),
        "strategy" => strategy.to_string(),
        "sub_search" => sub_search.to_string()
    )
    .increment(1);
}
