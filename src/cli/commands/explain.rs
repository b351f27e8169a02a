use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::cli::output::{ExplainReport, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{ChatCompletionsClient, HttpEmbeddingClient, IndexStore, StudyPipeline};

#[derive(Debug, Args)]
pub struct ExplainArgs {
    #[arg(required = true, help = "Unit the question came from")]
    pub unit: String,

    #[arg(required = true, help = "The quiz question text")]
    pub question: String,

    #[arg(long, required = true, help = "The answer the user picked")]
    pub answer: String,

    #[arg(long, required = true, help = "The correct answer")]
    pub correct: String,
}

pub async fn handle_explain(args: ExplainArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

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

    let explanation = pipeline
        .explain_answer(&args.unit, &args.question, &args.answer, &args.correct)
        .await
        .context("failed to generate explanation")?;

    let report = ExplainReport {
        question: args.question,
        user_answer: args.answer,
        correct_answer: args.correct,
        explanation,
    };
    print!("{}", formatter.format_explanation(&report));

    Ok(())
}
