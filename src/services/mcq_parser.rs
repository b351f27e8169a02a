//! Parsing of generated MCQ text into a tagged result.
//!
//! The generation provider is asked for a fixed block layout: a `Question:`
//! line, four option lines lettered A through D, an `Answer:` line naming one
//! letter, and an optional `Explanation:` line. Anything that does not match
//! parses to an error value; the pipeline skips those candidates and moves on.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::AnswerLetter;

static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^question\s*[:\-]\s*(.+)$").expect("valid question pattern"));

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-d])[\).:]\s+(.+)$").expect("valid option pattern"));

static ANSWER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^answer\s*[:\-]\s*\(?([a-d])\)?").expect("valid answer pattern")
});

static EXPLANATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^explanation\s*[:\-]\s*(.*)$").expect("valid explanation pattern")
});

/// A response block that matched the expected grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_letter: AnswerLetter,
    pub explanation: Option<String>,
}

/// Ways a generated block can fail the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum McqParseError {
    #[error("no question line")]
    MissingQuestion,

    #[error("expected 4 option lines, found {0}")]
    WrongOptionCount(usize),

    #[error("option letters out of order or repeated")]
    BadOptionLetters,

    #[error("no answer line")]
    MissingAnswer,

    #[error("empty or duplicate option text")]
    BadOptionText,
}

/// Parse one generated response against the strict block grammar.
pub fn parse_mcq_response(text: &str) -> Result<ParsedMcq, McqParseError> {
    let mut question: Option<String> = None;
    let mut options: Vec<(AnswerLetter, String)> = Vec::new();
    let mut answer: Option<AnswerLetter> = None;
    let mut explanation: Option<String> = None;
    let mut in_explanation = false;

    for raw_line in text.lines() {
        // Models often wrap labels in markdown bold; drop the markers before
        // matching.
        let line = raw_line.replace("**", "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = QUESTION_LINE.captures(line) {
            if question.is_none() {
                question = Some(caps[1].trim().to_string());
            }
            in_explanation = false;
        } else if let Some(caps) = ANSWER_LINE.captures(line) {
            if answer.is_none() {
                let letter = caps[1].chars().next().and_then(AnswerLetter::from_char);
                answer = letter;
            }
            in_explanation = false;
        } else if let Some(caps) = EXPLANATION_LINE.captures(line) {
            if explanation.is_none() {
                explanation = Some(caps[1].trim().to_string());
                in_explanation = true;
            }
        } else if let Some(caps) = OPTION_LINE.captures(line) {
            if let Some(letter) = caps[1].chars().next().and_then(AnswerLetter::from_char) {
                options.push((letter, caps[2].trim().to_string()));
            }
            in_explanation = false;
        } else if in_explanation {
            // Explanations may run over several lines.
            if let Some(ref mut expl) = explanation {
                if !expl.is_empty() {
                    expl.push(' ');
                }
                expl.push_str(line);
            }
        }
    }

    let question = question.ok_or(McqParseError::MissingQuestion)?;
    if question.is_empty() {
        return Err(McqParseError::MissingQuestion);
    }
    if options.len() != 4 {
        return Err(McqParseError::WrongOptionCount(options.len()));
    }
    for (expected, (found, _)) in AnswerLetter::ALL.iter().zip(options.iter()) {
        if expected != found {
            return Err(McqParseError::BadOptionLetters);
        }
    }
    let correct_letter = answer.ok_or(McqParseError::MissingAnswer)?;

    let texts: Vec<String> = options.into_iter().map(|(_, text)| text).collect();
    if texts.iter().any(|t| t.is_empty()) {
        return Err(McqParseError::BadOptionText);
    }
    for i in 0..texts.len() {
        for j in (i + 1)..texts.len() {
            if texts[i] == texts[j] {
                return Err(McqParseError::BadOptionText);
            }
        }
    }

    let explanation = explanation.filter(|e| !e.is_empty());

    Ok(ParsedMcq {
        question,
        options: texts,
        correct_letter,
        explanation,
    })
}
