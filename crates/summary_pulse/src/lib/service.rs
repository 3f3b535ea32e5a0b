use serde::Serialize;
use summary_datastore::{CacheRecord, DataStore, StructuredSummary, VideoMetadata};

use crate::{
    archive::{ArchiveError, ArchiveStore},
    error::SummarizeError,
    validator,
    workflow::SummaryWorkflow,
    CompletionService, Transcript,
};

pub mod builder;

/// Serves summaries from the cache store and computes them on a miss
///
/// Concurrent calls for the same uncached video are not coordinated: both
/// compute and both insert a row. Lookups always pick the newest row, so the
/// duplicate work is wasted but harmless.
#[derive(Debug)]
pub struct SummaryService<D, C, A>
where
    D: DataStore + Send + Sync + 'static,
    C: CompletionService + Send + Sync + 'static,
    A: ArchiveStore + Send + Sync + 'static,
{
    pub(crate) store: D,
    pub(crate) completion: C,
    pub(crate) archive: A,
    pub(crate) refine: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Cache,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutcome {
    pub summary: StructuredSummary,
    pub archive_path: Option<String>,
    pub source: SummarySource,
}

impl<D, C, A> SummaryService<D, C, A>
where
    D: DataStore + Send + Sync + 'static,
    C: CompletionService + Send + Sync + 'static,
    A: ArchiveStore + Send + Sync + 'static,
{
    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Returns the latest cached summary for `video_id`, or computes, archives
    /// and caches a new one.
    ///
    /// Only completion and validation failures are fatal. Archive and cache
    /// write failures are logged and the computed summary is still returned.
    #[tracing::instrument(skip(self, transcript, metadata))]
    pub async fn summarize(
        &self,
        video_id: &str,
        transcript: &Transcript,
        metadata: &VideoMetadata,
    ) -> Result<SummaryOutcome, SummarizeError> {
        if let Some(outcome) = self.cached(video_id).await {
            return Ok(outcome);
        }

        if transcript.is_blank() {
            return Err(SummarizeError::EmptyTranscript {
                video_id: video_id.to_string(),
            });
        }

        let raw = SummaryWorkflow::new(&self.completion, self.refine)
            .run(transcript)
            .await?;

        let summary = validator::validate(&raw)
            .inspect_err(|e| tracing::error!(error = %e, "Completion output failed validation"))?;

        let archive_path = self.archive_summary(video_id, &summary, metadata).await;

        let record = CacheRecord::new(
            video_id,
            metadata.clone(),
            summary.clone(),
            archive_path.clone(),
        );
        self.cache_summary(&record).await;

        Ok(SummaryOutcome {
            summary,
            archive_path,
            source: SummarySource::Computed,
        })
    }

    /// The latest cached summary for `video_id`, if any. Lets callers skip
    /// fetching a transcript when the cache already answers.
    #[tracing::instrument(skip(self))]
    pub async fn cached(&self, video_id: &str) -> Option<SummaryOutcome> {
        let record = self.cached_summary(video_id).await?;
        tracing::info!(created_at = %record.created_at, "Serving summary from cache");

        Some(SummaryOutcome {
            summary: record.summary,
            archive_path: record.archive_path,
            source: SummarySource::Cache,
        })
    }

    /// A failing lookup is treated like a miss
    async fn cached_summary(&self, video_id: &str) -> Option<CacheRecord> {
        self.store
            .latest_summary(video_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(error = ?e, "Cache lookup failed, computing summary instead")
            })
            .ok()
            .flatten()
    }

    async fn archive_summary(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Option<String> {
        match self.archive.save(video_id, summary, metadata).await {
            Ok(path) => Some(path),
            Err(ArchiveError::Disabled) => {
                tracing::debug!("Archiving disabled, skipping");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to archive summary, continuing without it");
                None
            }
        }
    }

    async fn cache_summary(&self, record: &CacheRecord) {
        match self.store.insert_summary(record).await {
            Ok(id) => tracing::info!(id, "Cached summary"),
            Err(e) => tracing::error!(error = ?e, "Failed to cache summary, continuing without it"),
        }
    }
}
