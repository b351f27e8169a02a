//! The retrieval-generation pipeline: notes, quizzes, and explanations.

use std::sync::Arc;

use crate::error::{IndexError, PipelineError};
use crate::models::{Mcq, RetrievalConfig};
use crate::services::mcq_parser::parse_mcq_response;
use crate::services::{GenerationProvider, IndexStore};
use crate::utils::truncate_chars;

/// Fixed synthetic query used to pull summary-worthy context for notes.
const NOTES_QUERY: &str = "summary";
/// Fixed synthetic query used to pull quiz-worthy context for MCQs.
const MCQ_QUERY: &str = "mcq";

/// Drives the study-aid operations over one [`IndexStore`] and one
/// generation provider.
///
/// Every provider call is synchronous from the caller's point of view and
/// single-attempt: MCQ items cost one round-trip each, issued sequentially,
/// and a provider failure aborts the in-flight operation without retry.
pub struct StudyPipeline {
    store: IndexStore,
    generator: Arc<dyn GenerationProvider>,
    model: String,
    retrieval: RetrievalConfig,
}

impl StudyPipeline {
    pub fn new(
        store: IndexStore,
        generator: Arc<dyn GenerationProvider>,
        model: impl Into<String>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            generator,
            model: model.into(),
            retrieval,
        }
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Retrieve the `top_k` closest chunk texts for `query`, best match
    /// first, distances dropped.
    pub async fn retrieve_context(
        &mut self,
        unit: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>, IndexError> {
        let results = self.store.search(unit, query, top_k).await?;
        Ok(results.into_iter().map(|r| r.text).collect())
    }

    /// Summarize a unit into revision notes.
    pub async fn generate_notes(&mut self, unit: &str) -> Result<String, PipelineError> {
        let top_k = self.retrieval.notes_top_k as usize;
        let context = self.retrieve_context(unit, NOTES_QUERY, top_k).await?;
        if context.is_empty() {
            return Err(PipelineError::ContextUnavailable(unit.to_string()));
        }

        let prompt = format!(
            "Summarize the following chapter for a student preparing for exams.\n\n{}",
            context.join("\n")
        );
        let notes = self.generator.complete(&self.model, &prompt).await?;
        Ok(notes.trim().to_string())
    }

    /// Generate up to `count` validated MCQs for a unit.
    ///
    /// One provider round-trip per requested item; a response that fails the
    /// block grammar is dropped and does not count, so the result may be
    /// shorter than `count` (down to empty) without this being an error.
    /// Provider failures abort and propagate.
    pub async fn generate_mcqs(
        &mut self,
        unit: &str,
        count: usize,
    ) -> Result<Vec<Mcq>, PipelineError> {
        let top_k = self.retrieval.mcq_top_k as usize;
        let context = self.retrieve_context(unit, MCQ_QUERY, top_k).await?;
        if context.is_empty() {
            return Err(PipelineError::ContextUnavailable(unit.to_string()));
        }

        let joined = context.join("\n");
        let budget = self.retrieval.context_char_budget as usize;
        let context = truncate_chars(&joined, budget).to_string();
        let prompt = mcq_prompt(&context);

        let mut mcqs = Vec::with_capacity(count);
        for _ in 0..count {
            let response = self.generator.complete(&self.model, &prompt).await?;
            let Ok(parsed) = parse_mcq_response(&response) else {
                continue;
            };
            let candidate = Mcq::new(
                parsed.question,
                parsed.options,
                parsed.correct_letter,
                parsed.explanation.unwrap_or_default(),
            );
            if let Some(mcq) = candidate {
                mcqs.push(mcq);
            }
        }
        Ok(mcqs)
    }

    /// Explain why the correct answer beats the user's answer, grounded in
    /// context retrieved for the question text.
    pub async fn explain_answer(
        &mut self,
        unit: &str,
        question: &str,
        user_answer: &str,
        correct_answer: &str,
    ) -> Result<String, PipelineError> {
        let top_k = self.retrieval.explain_top_k as usize;
        let context = self.retrieve_context(unit, question, top_k).await?;

        let prompt = format!(
            "Given the following question and context:\n{}\nContext:\n{}\n\
             The user's answer was: {}\nThe correct answer is: {}.\n\
             Explain why the user's answer is incorrect and provide the correct reasoning.",
            question,
            context.join("\n"),
            user_answer,
            correct_answer
        );
        let explanation = self.generator.complete(&self.model, &prompt).await?;
        Ok(explanation.trim().to_string())
    }
}

fn mcq_prompt(context: &str) -> String {
    format!(
        "You are writing a quiz for students. Using only the facts in the \
         context below, write one multiple-choice question.\n\n\
         Context:\n{}\n\n\
         Respond in exactly this format:\n\
         Question: <the question>\n\
         A) <first option>\n\
         B) <second option>\n\
         C) <third option>\n\
         D) <fourth option>\n\
         Answer: <letter of the correct option>\n\
         Explanation: <one or two sentences>",
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{EmbeddingError, GenerationError};
    use crate::services::{EmbeddingProvider, IndexStore};

    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            // Two fixed features keep the math trivial: text length and
            // vowel count, both scaled down.
            Ok(texts
                .iter()
                .map(|t| {
                    let len = t.len() as f32 / 100.0;
                    let vowels = t.chars().filter(|c| "aeiou".contains(*c)).count() as f32 / 10.0;
                    vec![len, vowels]
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "fake-embedder-v1"
        }
    }

    /// Replays a fixed script of responses, or fails once the script runs
    /// dry.
    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .rev()
                        .map(|r| r.map(String::from).map_err(String::from))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedGenerator {
        async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            let mut responses = self.responses.lock().unwrap();
            match responses.pop() {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(GenerationError::ServerError(msg)),
                None => Err(GenerationError::ServerError("script exhausted".to_string())),
            }
        }
    }

    const GOOD_BLOCK: &str = "Question: Which animal purrs?\n\
        A) Cats\n\
        B) Dogs\n\
        C) Birds\n\
        D) Fish\n\
        Answer: A\n\
        Explanation: Purring is feline.";

    async fn pipeline_with(
        dir: &Path,
        responses: Vec<Result<&str, &str>>,
    ) -> StudyPipeline {
        let mut store = IndexStore::new(Arc::new(FakeEmbedder), dir).unwrap();
        store
            .build(
                "UNIT 1",
                vec![
                    "Cats are mammals. Cats purr.".to_string(),
                    "Dogs are mammals. Dogs bark.".to_string(),
                ],
            )
            .await
            .unwrap();
        StudyPipeline::new(
            store,
            Arc::new(ScriptedGenerator::new(responses)),
            "test-model",
            RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_generate_notes_trims_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline =
            pipeline_with(dir.path(), vec![Ok("  Cats and dogs are mammals.  \n")]).await;
        let notes = pipeline.generate_notes("UNIT 1").await.unwrap();
        assert_eq!(notes, "Cats and dogs are mammals.");
    }

    #[tokio::test]
    async fn test_notes_for_unknown_unit_fail_with_index_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_with(dir.path(), vec![Ok("unused")]).await;
        assert!(matches!(
            pipeline.generate_notes("UNIT 7").await,
            Err(PipelineError::IndexError(IndexError::IndexNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_mcq_best_effort_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_with(
            dir.path(),
            vec![
                Ok(GOOD_BLOCK),
                Ok("I cannot answer that in the requested format."),
                Ok(GOOD_BLOCK),
            ],
        )
        .await;

        let mcqs = pipeline.generate_mcqs("UNIT 1", 3).await.unwrap();
        assert_eq!(mcqs.len(), 2);
        for mcq in &mcqs {
            assert_eq!(mcq.options.len(), 4);
            assert_eq!(mcq.correct, mcq.options[mcq.correct_letter.index()]);
        }
    }

    #[tokio::test]
    async fn test_mcq_all_malformed_yields_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_with(
            dir.path(),
            vec![Ok("nonsense"), Ok("more nonsense")],
        )
        .await;

        let mcqs = pipeline.generate_mcqs("UNIT 1", 2).await.unwrap();
        assert!(mcqs.is_empty());
    }

    #[tokio::test]
    async fn test_mcq_provider_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_with(
            dir.path(),
            vec![Ok(GOOD_BLOCK), Err("upstream 500"), Ok(GOOD_BLOCK)],
        )
        .await;

        assert!(matches!(
            pipeline.generate_mcqs("UNIT 1", 3).await,
            Err(PipelineError::GenerationError(_))
        ));
    }

    #[tokio::test]
    async fn test_explain_answer_contrasts_answers() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_with(
            dir.path(),
            vec![Ok("Dogs bark; purring is specific to cats.")],
        )
        .await;

        let explanation = pipeline
            .explain_answer("UNIT 1", "Which animal purrs?", "Dogs", "Cats")
            .await
            .unwrap();
        assert!(explanation.contains("cats"));
    }
}
