use std::ops::Deref;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One timed unit of spoken text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Ordered transcript chunks of a single video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptChunk>);

impl Transcript {
    pub fn new(chunks: Vec<TranscriptChunk>) -> Self {
        Transcript(chunks)
    }

    /// Chunk texts in their original order, separated by single spaces
    pub fn full_text(&self) -> String {
        self.0.iter().map(|chunk| chunk.text.as_str()).join(" ")
    }

    /// True when there is no spoken text at all
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|chunk| chunk.text.trim().is_empty())
    }
}

impl Deref for Transcript {
    type Target = [TranscriptChunk];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<TranscriptChunk>> for Transcript {
    fn from(value: Vec<TranscriptChunk>) -> Self {
        Transcript(value)
    }
}
