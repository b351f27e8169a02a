use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::output::{QuizReport, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{ChatCompletionsClient, HttpEmbeddingClient, IndexStore, StudyPipeline};

#[derive(Debug, Args)]
pub struct QuizArgs {
    #[arg(required = true, help = "Unit to quiz on (e.g. 'Chapter 1')")]
    pub unit: String,

    #[arg(
        long,
        short = 'n',
        default_value_t = 3,
        help = "Number of questions to generate"
    )]
    pub count: usize,

    #[arg(long, help = "Include answers and explanations in the output")]
    pub reveal: bool,
}

pub async fn handle_quiz(args: QuizArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    if args.count == 0 {
        anyhow::bail!("count must be at least 1");
    }

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

    let mcqs = pipeline
        .generate_mcqs(&args.unit, args.count)
        .await
        .context("failed to generate quiz")?;

    if verbose {
        eprintln!(
            "Generated {} of {} questions in {}ms",
            mcqs.len(),
            args.count,
            start_time.elapsed().as_millis()
        );
    }

    let report = QuizReport {
        unit: args.unit,
        requested: args.count,
        mcqs,
        reveal: args.reveal,
    };
    print!("{}", formatter.format_quiz(&report));

    Ok(())
}
