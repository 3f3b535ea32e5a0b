//! Free-form questions about a video, answered from its transcript or summary

use crate::{llm::prompts, CompletionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionContext {
    Transcript,
    Summary,
}

impl QuestionContext {
    pub fn label(self) -> &'static str {
        match self {
            QuestionContext::Transcript => "transcript",
            QuestionContext::Summary => "summary",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("Both a question and a {0} are required")]
    MissingInput(&'static str),
    #[error("Completion service failed: {0}")]
    Completion(String),
}

#[tracing::instrument(skip(completion, context_text, question), fields(context = context.label()))]
pub async fn answer_question<C: CompletionService>(
    completion: &C,
    context: QuestionContext,
    context_text: &str,
    question: &str,
) -> Result<String, QuestionError> {
    if question.trim().is_empty() || context_text.trim().is_empty() {
        return Err(QuestionError::MissingInput(context.label()));
    }

    let label = context.label();
    completion
        .complete(
            &prompts::question_system(label),
            &prompts::question_user(label, context_text, question),
        )
        .await
        .map_err(|e| QuestionError::Completion(e.to_string()))
}
