//! Ingest command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

use crate::cli::output::{IngestStats, get_formatter};
use crate::models::{Config, OutputFormat, UnitMap};
use crate::services::{HttpEmbeddingClient, IndexStore, WordChunker, split_into_units};

/// Unit name under which the entire document is indexed with `--full-book`.
const FULL_BOOK_UNIT: &str = "Full Book";

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to a text file, or a directory of .txt page files in path order
    #[arg(required = true)]
    pub path: PathBuf,

    /// Skip heading detection and index the whole document under this unit name
    #[arg(long)]
    pub unit: Option<String>,

    /// Also index the entire document as one "Full Book" unit
    #[arg(long)]
    pub full_book: bool,

    /// Words per chunk (overrides config)
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Words shared between neighboring chunks (overrides config)
    #[arg(long)]
    pub overlap: Option<usize>,
}

pub async fn handle_ingest(args: IngestArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    if !args.path.exists() {
        anyhow::bail!("path does not exist: {}", args.path.display());
    }

    let text = read_source_text(&args.path)?;
    if text.trim().is_empty() {
        anyhow::bail!("no text found at {}", args.path.display());
    }

    let mut units = if let Some(ref unit) = args.unit {
        let mut map = UnitMap::new();
        map.insert(unit.as_str(), text.trim());
        map
    } else {
        split_into_units(&text)
    };

    if args.full_book {
        units.insert(FULL_BOOK_UNIT, text.trim());
    }

    if units.is_empty() {
        anyhow::bail!(
            "no 'Chapter <n>' or 'Unit <n>' headings found; pass --unit <name> to index the whole document"
        );
    }

    if verbose {
        eprintln!("Found {} unit(s) to index", units.len());
    }

    let max_tokens = args
        .max_tokens
        .unwrap_or(config.indexing.chunk_max_tokens as usize);
    let overlap = args
        .overlap
        .unwrap_or(config.indexing.chunk_overlap as usize);
    let chunker = WordChunker::new(max_tokens, overlap).context("invalid chunking parameters")?;

    let embedder = Arc::new(HttpEmbeddingClient::new(&config.embedding)?);
    let index_dir = config.indexing.resolved_index_dir()?;
    let mut store = IndexStore::new(embedder, index_dir)?;

    let pb = ProgressBar::new(units.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut stats = IngestStats::default();
    for (unit, unit_text) in units.iter() {
        pb.inc(1);

        let chunks = chunker.chunk(unit_text);
        if chunks.is_empty() {
            if verbose {
                pb.println(format!("Skipping empty unit '{}'", unit));
            }
            continue;
        }

        let count = store.build(unit, chunks).await?;
        stats.units_indexed += 1;
        stats.chunks_created += count as u64;

        if verbose {
            pb.println(format!("Indexed '{}' ({} chunks)", unit, count));
        }
    }
    pb.finish_and_clear();

    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    print!("{}", formatter.format_ingest_stats(&stats));

    Ok(())
}

/// Read a single text file, or a directory of `.txt` page files concatenated
/// in path order (the shape the OCR pipeline leaves behind).
fn read_source_text(path: &Path) -> Result<String> {
    if path.is_file() {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut pages: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .map(|e| e.into_path())
        .collect();
    pages.sort();

    if pages.is_empty() {
        anyhow::bail!("no .txt files found under {}", path.display());
    }

    let mut text = String::new();
    for page in &pages {
        let content = std::fs::read_to_string(page)
            .with_context(|| format!("failed to read {}", page.display()))?;
        text.push_str(&content);
        text.push('\n');
    }
    Ok(text)
}
