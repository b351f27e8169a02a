//! CLI module for the study aid.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Retrieval-augmented study aid: index textbook chapters, then generate
/// notes, quizzes, and answer explanations from them.
#[derive(Debug, Parser)]
#[command(name = "studyrag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check infrastructure status (embedding server, generation key, indexes)
    Status,

    /// Split a document into units and build their vector indexes
    Ingest(commands::IngestArgs),

    /// Search a unit's chunks by similarity
    Search(commands::SearchArgs),

    /// Generate revision notes for a unit
    Notes(commands::NotesArgs),

    /// Generate a multiple-choice quiz for a unit
    Quiz(commands::QuizArgs),

    /// Explain why an answer to a quiz question was wrong
    Explain(commands::ExplainArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}

// FromStr for OutputFormat is implemented in models::config
