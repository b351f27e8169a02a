use anyhow::Result;
use console::style;
use std::sync::Arc;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{HttpEmbeddingClient, IndexStore};

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let embedder = HttpEmbeddingClient::new(&config.embedding)?;
    let embedding_healthy = embedder.health_check().await.is_ok();

    let generation_key_present = std::env::var(&config.generation.api_key_env)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    let index_dir = config.indexing.resolved_index_dir()?;
    let store = IndexStore::new(Arc::new(embedder), &index_dir)?;
    let units = store.persisted_units().unwrap_or_default();

    let status = StatusInfo {
        embedding_url: config.embedding.url.clone(),
        embedding_healthy,
        embedding_model: config.embedding.model.clone(),
        generation_model: config.generation.model.clone(),
        generation_key_present,
        index_dir: index_dir.display().to_string(),
        units,
    };

    print!("{}", formatter.format_status(&status));

    if !embedding_healthy {
        eprintln!();
        eprintln!(
            "{} embedding server not reachable at {}. Start it before ingesting or searching.",
            style("Warning:").yellow().bold(),
            config.embedding.url
        );
    }
    if !generation_key_present {
        eprintln!(
            "{} {} is not set. Notes, quiz, and explain commands will fail.",
            style("Warning:").yellow().bold(),
            config.generation.api_key_env
        );
    }

    Ok(())
}
