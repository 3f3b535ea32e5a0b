//! # Summary Workflow
//!
//! A small state machine that turns a transcript into raw summary text:
//!
//! ```text
//! Draft ──(needs_refinement && refine enabled)──> Refine ──> Done
//!   └───────────────────(otherwise)───────────────────────────┘
//! ```
//!
//! Each stage consumes the current [`SummaryState`] and returns a new one.

use crate::{
    error::SummarizeError,
    llm::prompts::{self, ANALYSIS_SYSTEM, REFINE_SYSTEM, SUMMARY_SYSTEM},
    CompletionService, Transcript,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Draft,
    Refine,
    Done,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Refine => "refine",
            Stage::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryState<'t> {
    pub transcript: &'t Transcript,
    pub draft_text: String,
    pub needs_refinement: bool,
}

impl<'t> SummaryState<'t> {
    pub fn new(transcript: &'t Transcript) -> Self {
        SummaryState {
            transcript,
            draft_text: String::new(),
            needs_refinement: true,
        }
    }
}

/// Decides the stage that follows `stage` once it has produced `state`
pub fn next_stage(stage: Stage, state: &SummaryState<'_>, refine_enabled: bool) -> Stage {
    match stage {
        Stage::Draft if state.needs_refinement && refine_enabled => Stage::Refine,
        Stage::Draft | Stage::Refine | Stage::Done => Stage::Done,
    }
}

pub struct SummaryWorkflow<'c, C> {
    completion: &'c C,
    refine: bool,
}

impl<'c, C: CompletionService> SummaryWorkflow<'c, C> {
    pub fn new(completion: &'c C, refine: bool) -> Self {
        SummaryWorkflow { completion, refine }
    }

    /// Drives the state machine to completion and returns the final text
    #[tracing::instrument(skip_all, fields(chunks = transcript.len(), refine = self.refine))]
    pub async fn run(&self, transcript: &Transcript) -> Result<String, SummarizeError> {
        let mut stage = Stage::Draft;
        let mut state = SummaryState::new(transcript);

        loop {
            tracing::debug!(stage = stage.name(), "Entering workflow stage");
            state = match stage {
                Stage::Draft => self.draft(state).await?,
                Stage::Refine => self.refine(state).await?,
                Stage::Done => break,
            };
            stage = next_stage(stage, &state, self.refine);
        }

        Ok(state.draft_text)
    }

    /// Analysis pass followed by the formatting pass. Only the formatting
    /// output is kept; the analysis primes the model and is discarded.
    async fn draft<'t>(&self, state: SummaryState<'t>) -> Result<SummaryState<'t>, SummarizeError> {
        let text = state.transcript.full_text();

        let analysis = self
            .call(Stage::Draft, ANALYSIS_SYSTEM, &prompts::analysis_user(&text))
            .await?;
        tracing::debug!(chars = analysis.len(), "Discarding transcript analysis");

        let draft_text = self
            .call(Stage::Draft, SUMMARY_SYSTEM, &prompts::summary_user(&text))
            .await?;

        Ok(SummaryState {
            draft_text,
            needs_refinement: true,
            ..state
        })
    }

    async fn refine<'t>(&self, state: SummaryState<'t>) -> Result<SummaryState<'t>, SummarizeError> {
        let draft_text = self
            .call(
                Stage::Refine,
                REFINE_SYSTEM,
                &prompts::refine_user(&state.draft_text),
            )
            .await?;

        Ok(SummaryState {
            draft_text,
            needs_refinement: false,
            ..state
        })
    }

    async fn call(&self, stage: Stage, system: &str, user: &str) -> Result<String, SummarizeError> {
        self.completion
            .complete(system, user)
            .await
            .map_err(|e| SummarizeError::Completion {
                stage: stage.name(),
                message: e.to_string(),
            })
            .inspect_err(|e| tracing::error!(error = %e, "Workflow stage failed"))
    }
}
