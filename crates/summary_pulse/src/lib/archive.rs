//! # Archive
//!
//! Durable, write-once copies of computed summaries. Every save produces a new
//! object whose name combines the video id, a UTC timestamp and a random
//! suffix, so an archive object is never overwritten.

pub mod gcs;
pub mod local;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use summary_datastore::{StructuredSummary, VideoMetadata};

pub use gcs::GcsArchive;
pub use local::LocalArchive;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archiving is disabled")]
    Disabled,
    #[error("Permission denied writing {object}: {message}")]
    PermissionDenied { object: String, message: String },
    #[error("Bucket {bucket} not found")]
    BucketNotFound { bucket: String },
    #[error("Archive object {object} already exists")]
    AlreadyExists { object: String },
    #[error("Storage API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait ArchiveStore {
    /// Writes a new archive object and returns its fully qualified address
    fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> impl Future<Output = Result<String, ArchiveError>> + Send;
}

/// `None` disables archiving; every save reports [`ArchiveError::Disabled`]
impl<A: ArchiveStore + Send + Sync> ArchiveStore for Option<A> {
    async fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Result<String, ArchiveError> {
        match self {
            Some(archive) => archive.save(video_id, summary, metadata).await,
            None => Err(ArchiveError::Disabled),
        }
    }
}

/// The archive backends selectable from configuration
#[derive(Debug, Clone)]
pub enum ArchiveBackend {
    Gcs(GcsArchive),
    Local(LocalArchive),
}

impl ArchiveStore for ArchiveBackend {
    async fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Result<String, ArchiveError> {
        match self {
            ArchiveBackend::Gcs(archive) => archive.save(video_id, summary, metadata).await,
            ArchiveBackend::Local(archive) => archive.save(video_id, summary, metadata).await,
        }
    }
}

/// The JSON body of an archive object
#[derive(Debug, Serialize)]
pub struct ArchiveDocument<'a> {
    pub video_id: &'a str,
    pub video_title: &'a str,
    pub video_description: &'a str,
    pub channel_title: &'a str,
    pub channel_id: &'a str,
    pub summary: &'a StructuredSummary,
    pub timestamp: DateTime<Utc>,
}

impl<'a> ArchiveDocument<'a> {
    pub fn new(
        video_id: &'a str,
        summary: &'a StructuredSummary,
        metadata: &'a VideoMetadata,
        timestamp: DateTime<Utc>,
    ) -> Self {
        ArchiveDocument {
            video_id,
            video_title: &metadata.title,
            video_description: &metadata.description,
            channel_title: &metadata.channel_title,
            channel_id: &metadata.channel_id,
            summary,
            timestamp,
        }
    }

    /// `summaries/<video id>/<timestamp>_<random suffix>.json`
    pub fn object_name(&self) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "summaries/{}/{}_{}.json",
            sanitize_path_segment(self.video_id),
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            &suffix[..8]
        )
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ArchiveError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Keeps object names inside the archive prefix whatever the caller passes
fn sanitize_path_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".into()
    } else {
        cleaned
    }
}
