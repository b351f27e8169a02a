use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::output::{NotesReport, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{ChatCompletionsClient, HttpEmbeddingClient, IndexStore, StudyPipeline};

#[derive(Debug, Args)]
pub struct NotesArgs {
    #[arg(required = true, help = "Unit to summarize (e.g. 'Chapter 1')")]
    pub unit: String,
}

pub async fn handle_notes(args: NotesArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let embedder = Arc::new(HttpEmbeddingClient::new(&config.embedding)?);
    let index_dir = config.indexing.resolved_index_dir()?;
    let store = IndexStore::new(embedder, index_dir)?;
    let generator = Arc::new(ChatCompletionsClient::new(&config.generation)?);
    let mut pipeline = StudyPipeline::new(
        store,
        generator,
        config.generation.model.clone(),
        config.retrieval.clone(),
    );

    let notes = pipeline
        .generate_notes(&args.unit)
        .await
        .context("failed to generate notes")?;

    if verbose {
        eprintln!("Generated notes in {}ms", start_time.elapsed().as_millis());
    }

    let report = NotesReport {
        unit: args.unit,
        notes,
    };
    print!("{}", formatter.format_notes(&report));

    Ok(())
}
