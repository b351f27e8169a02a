//! Multiple-choice question models.

use serde::{Deserialize, Serialize};

/// The four option letters of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    /// Zero-based index of the letter within the option list.
    pub fn index(self) -> usize {
        match self {
            AnswerLetter::A => 0,
            AnswerLetter::B => 1,
            AnswerLetter::C => 2,
            AnswerLetter::D => 3,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(AnswerLetter::A),
            'B' => Some(AnswerLetter::B),
            'C' => Some(AnswerLetter::C),
            'D' => Some(AnswerLetter::D),
            _ => None,
        }
    }

    pub const ALL: [AnswerLetter; 4] = [
        AnswerLetter::A,
        AnswerLetter::B,
        AnswerLetter::C,
        AnswerLetter::D,
    ];
}

impl std::fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            AnswerLetter::A => 'A',
            AnswerLetter::B => 'B',
            AnswerLetter::C => 'C',
            AnswerLetter::D => 'D',
        };
        write!(f, "{}", c)
    }
}

/// A validated multiple-choice question.
///
/// `correct` always equals `options[correct_letter.index()]`; the only way to
/// construct an `Mcq` is through [`Mcq::new`], which enforces that along with
/// the four-distinct-non-empty-options requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
    pub correct_letter: AnswerLetter,
    pub explanation: String,
}

impl Mcq {
    /// Build an MCQ from parsed parts. Returns `None` when the parts violate
    /// the invariants (wrong option count, empty or duplicate options, empty
    /// question); a candidate that fails here is discarded, not stored.
    pub fn new(
        question: String,
        options: Vec<String>,
        correct_letter: AnswerLetter,
        explanation: String,
    ) -> Option<Self> {
        if question.trim().is_empty() || options.len() != 4 {
            return None;
        }
        if options.iter().any(|o| o.trim().is_empty()) {
            return None;
        }
        for i in 0..options.len() {
            for j in (i + 1)..options.len() {
                if options[i] == options[j] {
                    return None;
                }
            }
        }
        let correct = options[correct_letter.index()].clone();
        Some(Self {
            question,
            options,
            correct,
            correct_letter,
            explanation,
        })
    }

    /// Answer-redacted projection safe to hand to a front-end before the
    /// user has submitted an answer.
    pub fn public_view(&self) -> McqPublic {
        McqPublic {
            question: self.question.clone(),
            options: self.options.clone(),
        }
    }

    /// Check a submitted option against the correct one.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct
    }
}

/// An MCQ with the answer fields stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqPublic {
    pub question: String,
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec![
            "mitochondria".to_string(),
            "ribosome".to_string(),
            "nucleus".to_string(),
            "chloroplast".to_string(),
        ]
    }

    #[test]
    fn test_letter_index_round_trip() {
        for letter in AnswerLetter::ALL {
            let c = letter.to_string().chars().next().unwrap();
            assert_eq!(AnswerLetter::from_char(c), Some(letter));
        }
        assert_eq!(AnswerLetter::from_char('b'), Some(AnswerLetter::B));
        assert_eq!(AnswerLetter::from_char('E'), None);
    }

    #[test]
    fn test_correct_matches_letter() {
        let mcq = Mcq::new(
            "Which organelle produces ATP?".to_string(),
            options(),
            AnswerLetter::A,
            "ATP synthesis happens in the mitochondria.".to_string(),
        )
        .unwrap();
        assert_eq!(mcq.correct, mcq.options[mcq.correct_letter.index()]);
        assert!(mcq.is_correct("mitochondria"));
        assert!(!mcq.is_correct("nucleus"));
    }

    #[test]
    fn test_rejects_wrong_option_count() {
        let mut opts = options();
        opts.pop();
        assert!(Mcq::new("q?".to_string(), opts, AnswerLetter::A, String::new()).is_none());
    }

    #[test]
    fn test_rejects_duplicate_options() {
        let mut opts = options();
        opts[3] = opts[0].clone();
        assert!(Mcq::new("q?".to_string(), opts, AnswerLetter::A, String::new()).is_none());
    }

    #[test]
    fn test_public_view_has_no_answer_fields() {
        let mcq = Mcq::new(
            "q?".to_string(),
            options(),
            AnswerLetter::C,
            "because".to_string(),
        )
        .unwrap();
        let public = mcq.public_view();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("correct").is_none());
        assert!(json.get("correct_letter").is_none());
        assert!(json.get("explanation").is_none());
        assert_eq!(public.options.len(), 4);
    }
}
