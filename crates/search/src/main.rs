//! ResumeRAG search tool
//!
//! Indexes one resume text file under a chosen strategy and prints the
//! results of each query as JSON:
//!
//! ```text
//! resume-search <resume.txt> <query> [<query> ...]
//! ```
//!
//! `RESUME_SEARCH_STRATEGY` overrides `indexing.default_strategy` and
//! `RESUME_SEARCH_TOP_K` sets the result count (default 5).

use anyhow::{bail, Context};
use futures::future::join_all;
use resumerag_common::{
    config::AppConfig, embeddings::create_embedder, metrics::register_metrics,
    models::Metadata, telemetry::init_tracing, vector_store::InMemoryVectorStore, VERSION,
};
use resumerag_search::{IndexerContext, IndexerFactory};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config.observability);
    register_metrics();

    info!("Starting ResumeRAG search v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: resume-search <resume.txt> <query> [<query> ...]");
    };
    let queries: Vec<String> = args.collect();

    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;

    let embedder = create_embedder(&config.embedding)?;
    let store = Arc::new(InMemoryVectorStore::new(embedder));
    let context = IndexerContext::new(Arc::new(config.indexing.clone()), store);
    let factory = IndexerFactory::new(context);

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut indexer = match std::env::var("RESUME_SEARCH_STRATEGY") {
        Ok(strategy) => factory.create(&strategy, &session_id)?,
        Err(_) => factory.create_default(&session_id)?,
    };

    let top_k = std::env::var("RESUME_SEARCH_TOP_K")
        .ok()
        .and_then(|k| k.parse().ok())
        .unwrap_or(5);

    let mut metadata = Metadata::new();
    metadata.insert("filename".to_string(), path.clone());
    let outcome = indexer.index(&text, metadata).await?;

    info!(
        strategy = indexer.strategy(),
        chunks_created = outcome.chunks_created,
        "Resume indexed"
    );

    let filters = Metadata::new();
    let searches = queries
        .iter()
        .map(|query| indexer.search(query, top_k, &filters));
    let answers = join_all(searches).await;

    let report = json!({
        "strategy": indexer.strategy(),
        "document_id": outcome.document_id,
        "stats": indexer.stats(),
        "queries": queries
            .iter()
            .zip(answers)
            .map(|(query, results)| json!({
                "query": query,
                "results": results
                    .iter()
                    .map(|r| json!({
                        "score": r.score,
                        "chunk_type": r.chunk_type(),
                        "section": r.source_chunk.section_tag,
                        "content": r.content,
                    }))
                    .collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
