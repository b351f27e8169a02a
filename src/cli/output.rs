use std::fmt::Write as FmtWrite;

use crate::models::{Mcq, OutputFormat, RetrievedChunk};
use crate::services::UnitSummary;

pub trait Formatter {
    fn format_search_results(&self, report: &SearchReport) -> String;
    fn format_notes(&self, report: &NotesReport) -> String;
    fn format_quiz(&self, report: &QuizReport) -> String;
    fn format_explanation(&self, report: &ExplainReport) -> String;
    fn format_ingest_stats(&self, stats: &IngestStats) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub unit: String,
    pub query: String,
    pub results: Vec<RetrievedChunk>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct NotesReport {
    pub unit: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct QuizReport {
    pub unit: String,
    pub requested: usize,
    pub mcqs: Vec<Mcq>,
    /// When false, answer fields are withheld from every format.
    pub reveal: bool,
}

#[derive(Debug, Clone)]
pub struct ExplainReport {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub units_indexed: u64,
    pub chunks_created: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub embedding_url: String,
    pub embedding_healthy: bool,
    pub embedding_model: String,
    pub generation_model: String,
    pub generation_key_present: bool,
    pub index_dir: String,
    pub units: Vec<UnitSummary>,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_search_results(&self, report: &SearchReport) -> String {
        if report.results.is_empty() {
            return format!("No results found for: {}\n", report.query);
        }

        let mut output = String::new();
        writeln!(
            output,
            "Search results for \"{}\" in {}",
            report.query, report.unit
        )
        .unwrap();
        writeln!(
            output,
            "Found {} results in {}ms\n",
            report.results.len(),
            report.duration_ms
        )
        .unwrap();

        for (i, result) in report.results.iter().enumerate() {
            writeln!(output, "{}. [Distance: {:.4}]", i + 1, result.distance).unwrap();
            let preview: String = result.text.chars().take(200).collect();
            let preview = if result.text.chars().count() > 200 {
                format!("{}...", preview)
            } else {
                preview
            };
            for line in preview.lines() {
                writeln!(output, "   {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_notes(&self, report: &NotesReport) -> String {
        let mut output = String::new();
        writeln!(output, "Notes for {}", report.unit).unwrap();
        writeln!(output, "{}", "-".repeat(10 + report.unit.len())).unwrap();
        writeln!(output, "{}", report.notes).unwrap();
        output
    }

    fn format_quiz(&self, report: &QuizReport) -> String {
        if report.mcqs.is_empty() {
            return format!(
                "No valid questions were generated for {} ({} requested). Try again.\n",
                report.unit, report.requested
            );
        }

        let mut output = String::new();
        writeln!(output, "Quiz for {}", report.unit).unwrap();
        if report.mcqs.len() < report.requested {
            writeln!(
                output,
                "({} of {} requested questions passed validation)",
                report.mcqs.len(),
                report.requested
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        for (i, mcq) in report.mcqs.iter().enumerate() {
            writeln!(output, "Q{}: {}", i + 1, mcq.question).unwrap();
            for (letter, option) in ["A", "B", "C", "D"].iter().zip(mcq.options.iter()) {
                writeln!(output, "  {}) {}", letter, option).unwrap();
            }
            if report.reveal {
                writeln!(output, "  Answer: {}) {}", mcq.correct_letter, mcq.correct).unwrap();
                if !mcq.explanation.is_empty() {
                    writeln!(output, "  Explanation: {}", mcq.explanation).unwrap();
                }
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_explanation(&self, report: &ExplainReport) -> String {
        let mut output = String::new();
        writeln!(output, "Question: {}", report.question).unwrap();
        writeln!(output, "Your answer: {}", report.user_answer).unwrap();
        writeln!(output, "Correct answer: {}", report.correct_answer).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", report.explanation).unwrap();
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "Ingestion Complete").unwrap();
        writeln!(output, "------------------").unwrap();
        writeln!(output, "Units indexed:  {}", stats.units_indexed).unwrap();
        writeln!(output, "Chunks created: {}", stats.chunks_created).unwrap();
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let embedding_status = if status.embedding_healthy {
            "[CONNECTED]"
        } else {
            "[DISCONNECTED]"
        };
        writeln!(output, "Embedding:   {}", embedding_status).unwrap();
        writeln!(output, "  URL:       {}", status.embedding_url).unwrap();
        writeln!(output, "  Model:     {}", status.embedding_model).unwrap();

        let key_status = if status.generation_key_present {
            "[KEY SET]"
        } else {
            "[KEY MISSING]"
        };
        writeln!(output, "Generation:  {}", key_status).unwrap();
        writeln!(output, "  Model:     {}", status.generation_model).unwrap();

        writeln!(output, "Index dir:   {}", status.index_dir).unwrap();
        if status.units.is_empty() {
            writeln!(output, "No units ingested yet.").unwrap();
        } else {
            writeln!(output, "Units:").unwrap();
            for unit in &status.units {
                writeln!(output, "  {} ({} chunks)", unit.unit, unit.chunk_count).unwrap();
            }
        }

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, json: &serde_json::Value) -> String {
        if self.pretty {
            serde_json::to_string_pretty(json).unwrap()
        } else {
            serde_json::to_string(json).unwrap()
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_search_results(&self, report: &SearchReport) -> String {
        let results: Vec<serde_json::Value> = report
            .results
            .iter()
            .map(|r| serde_json::json!({"text": r.text, "distance": r.distance}))
            .collect();
        self.render(&serde_json::json!({
            "unit": report.unit,
            "query": report.query,
            "results": results,
            "duration_ms": report.duration_ms,
        }))
    }

    fn format_notes(&self, report: &NotesReport) -> String {
        self.render(&serde_json::json!({
            "unit": report.unit,
            "notes": report.notes,
        }))
    }

    fn format_quiz(&self, report: &QuizReport) -> String {
        let mcqs: Vec<serde_json::Value> = report
            .mcqs
            .iter()
            .map(|mcq| {
                if report.reveal {
                    serde_json::json!(mcq)
                } else {
                    serde_json::json!(mcq.public_view())
                }
            })
            .collect();
        self.render(&serde_json::json!({
            "unit": report.unit,
            "requested": report.requested,
            "mcqs": mcqs,
        }))
    }

    fn format_explanation(&self, report: &ExplainReport) -> String {
        self.render(&serde_json::json!({
            "question": report.question,
            "user_answer": report.user_answer,
            "correct_answer": report.correct_answer,
            "explanation": report.explanation,
        }))
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        self.render(&serde_json::json!({
            "units_indexed": stats.units_indexed,
            "chunks_created": stats.chunks_created,
            "duration_ms": stats.duration_ms,
        }))
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let units: Vec<serde_json::Value> = status
            .units
            .iter()
            .map(|u| serde_json::json!({"unit": u.unit, "chunks": u.chunk_count}))
            .collect();
        self.render(&serde_json::json!({
            "embedding": {
                "url": status.embedding_url,
                "healthy": status.embedding_healthy,
                "model": status.embedding_model,
            },
            "generation": {
                "model": status.generation_model,
                "key_present": status.generation_key_present,
            },
            "index_dir": status.index_dir,
            "units": units,
        }))
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({"message": message}).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({"error": error}).to_string()
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_search_results(&self, report: &SearchReport) -> String {
        if report.results.is_empty() {
            return format!("## No results found\n\nQuery: `{}`\n", report.query);
        }

        let mut output = String::new();
        writeln!(output, "## Search Results\n").unwrap();
        writeln!(output, "**Unit:** {}\n", report.unit).unwrap();
        writeln!(output, "**Query:** `{}`\n", report.query).unwrap();

        for (i, result) in report.results.iter().enumerate() {
            writeln!(output, "### {}. Distance: {:.4}\n", i + 1, result.distance).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output, "{}", result.text).unwrap();
            writeln!(output, "```\n").unwrap();
        }

        output
    }

    fn format_notes(&self, report: &NotesReport) -> String {
        format!("## Notes for {}\n\n{}\n", report.unit, report.notes)
    }

    fn format_quiz(&self, report: &QuizReport) -> String {
        if report.mcqs.is_empty() {
            return format!("## Quiz for {}\n\nNo valid questions generated.\n", report.unit);
        }

        let mut output = String::new();
        writeln!(output, "## Quiz for {}\n", report.unit).unwrap();

        for (i, mcq) in report.mcqs.iter().enumerate() {
            writeln!(output, "### Q{}: {}\n", i + 1, mcq.question).unwrap();
            for (letter, option) in ["A", "B", "C", "D"].iter().zip(mcq.options.iter()) {
                writeln!(output, "- **{})** {}", letter, option).unwrap();
            }
            if report.reveal {
                writeln!(output, "\n**Answer:** {}) {}", mcq.correct_letter, mcq.correct).unwrap();
                if !mcq.explanation.is_empty() {
                    writeln!(output, "\n> {}", mcq.explanation).unwrap();
                }
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_explanation(&self, report: &ExplainReport) -> String {
        let mut output = String::new();
        writeln!(output, "## Explanation\n").unwrap();
        writeln!(output, "**Question:** {}\n", report.question).unwrap();
        writeln!(output, "**Your answer:** {}\n", report.user_answer).unwrap();
        writeln!(output, "**Correct answer:** {}\n", report.correct_answer).unwrap();
        writeln!(output, "{}", report.explanation).unwrap();
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "## Ingestion Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Units indexed | {} |", stats.units_indexed).unwrap();
        writeln!(output, "| Chunks created | {} |", stats.chunks_created).unwrap();
        writeln!(output, "| Duration | {}ms |", stats.duration_ms).unwrap();
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Status\n").unwrap();

        let embedding_status = if status.embedding_healthy { "✅" } else { "❌" };
        writeln!(output, "### Embedding {}\n", embedding_status).unwrap();
        writeln!(output, "- **URL:** `{}`", status.embedding_url).unwrap();
        writeln!(output, "- **Model:** {}\n", status.embedding_model).unwrap();

        let key_status = if status.generation_key_present {
            "✅"
        } else {
            "❌"
        };
        writeln!(output, "### Generation {}\n", key_status).unwrap();
        writeln!(output, "- **Model:** {}\n", status.generation_model).unwrap();

        writeln!(output, "### Units\n").unwrap();
        if status.units.is_empty() {
            writeln!(output, "None ingested yet.").unwrap();
        } else {
            for unit in &status.units {
                writeln!(output, "- {} ({} chunks)", unit.unit, unit.chunk_count).unwrap();
            }
        }

        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("**Error:** {}\n", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}
