use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a single video as emitted by the completion model.
///
/// Field names match the JSON keys the model is asked to produce. Unknown keys
/// are rejected so that a drifting response shape fails loudly instead of
/// silently dropping content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredSummary {
    pub sub_title: String,
    pub overview: String,
    pub main_topics: Vec<String>,
    pub key_points: Vec<KeyPoint>,
    pub keywords: Vec<String>,
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyPoint {
    pub title: String,
    pub description: String,
}

/// Descriptive fields of a video. Every field is empty when the lookup failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub channel_id: String,
}

/// One persisted summary row. Rows are insert-only.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    pub video_id: String,
    pub metadata: VideoMetadata,
    pub summary: StructuredSummary,
    pub archive_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Creates a record stamped with the current time
    pub fn new(
        video_id: impl Into<String>,
        metadata: VideoMetadata,
        summary: StructuredSummary,
        archive_path: Option<String>,
    ) -> Self {
        CacheRecord {
            video_id: video_id.into(),
            metadata,
            summary,
            archive_path,
            created_at: Utc::now(),
        }
    }
}
