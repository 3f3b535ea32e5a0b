pub mod archive;
pub mod chat;
mod error;
mod format;
mod llm;
pub mod parser;
mod service;
pub mod telemetry;
mod types;
pub mod validator;
pub mod workflow;
pub mod yt;

pub use error::{Error, SummarizeError, TranscriptError};
pub use format::format_summary_markdown;
pub use llm::{
    completion::CompletionService,
    openai::{self, OpenAIClient},
};
pub use service::{builder::SummaryServiceBuilder, SummaryOutcome, SummarySource, SummaryService};
pub use summary_datastore::{CacheRecord, KeyPoint, StructuredSummary, VideoMetadata};
pub use types::{Transcript, TranscriptChunk};
