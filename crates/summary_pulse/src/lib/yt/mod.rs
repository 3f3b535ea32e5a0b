pub mod metadata;
pub mod transcript;

use std::future::Future;

use summary_datastore::VideoMetadata;

use crate::{error::TranscriptError, Transcript};

pub trait TranscriptSource {
    fn fetch_transcript(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Transcript, TranscriptError>> + Send;
}

/// Metadata lookups never fail; they degrade to empty fields instead
pub trait MetadataSource {
    fn fetch_metadata(&self, video_id: &str) -> impl Future<Output = VideoMetadata> + Send;
}
