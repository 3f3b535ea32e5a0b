use std::sync::{Arc, Mutex};
use summary_pulse::{
    archive::{ArchiveError, ArchiveStore},
    StructuredSummary, VideoMetadata,
};

#[derive(Clone, Default)]
pub struct MockArchive {
    pub saved: Arc<Mutex<Vec<(String, StructuredSummary, VideoMetadata)>>>,
    pub fail_with: Option<String>,
}

impl MockArchive {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl ArchiveStore for MockArchive {
    async fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Result<String, ArchiveError> {
        if let Some(ref msg) = self.fail_with {
            return Err(ArchiveError::PermissionDenied {
                object: format!("summaries/{video_id}/mock.json"),
                message: msg.clone(),
            });
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push((video_id.to_string(), summary.clone(), metadata.clone()));
        Ok(format!(
            "gs://mock-bucket/summaries/{video_id}/{}.json",
            saved.len()
        ))
    }
}
