use crate::validator::ResponseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while acquiring a transcript. These are "not found" class errors
/// and are surfaced to the caller as is.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("No transcript available in {languages:?} for video {video_id}")]
    NotAvailable {
        video_id: String,
        languages: Vec<String>,
    },
    #[error("Transcripts are disabled for video {video_id}")]
    Disabled { video_id: String },
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] Error),
}

/// Fatal failures of a summarize call. Persistence failures never show up
/// here; they are logged by the service and the call carries on.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("Completion service failed during {stage}: {message}")]
    Completion { stage: &'static str, message: String },
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error("Transcript for video {video_id} contains no text")]
    EmptyTranscript { video_id: String },
}
