use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::output::{SearchReport, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{HttpEmbeddingClient, IndexStore};

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Unit to search (e.g. 'Chapter 1')")]
    pub unit: String,

    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(long, short = 'n', default_value_t = 5, help = "Number of chunks to return")]
    pub top_k: usize,
}

pub async fn handle_search(args: SearchArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("search query cannot be empty");
    }
    if args.top_k == 0 {
        anyhow::bail!("top_k must be at least 1");
    }

    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let embedder = Arc::new(HttpEmbeddingClient::new(&config.embedding)?);
    let index_dir = config.indexing.resolved_index_dir()?;
    let mut store = IndexStore::new(embedder, index_dir)?;

    let results = store
        .search(&args.unit, query, args.top_k)
        .await
        .context("search failed")?;

    if verbose {
        eprintln!(
            "Searched '{}' in {}ms",
            args.unit,
            start_time.elapsed().as_millis()
        );
    }

    let report = SearchReport {
        unit: args.unit,
        query: query.to_string(),
        results,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    print!("{}", formatter.format_search_results(&report));

    Ok(())
}
