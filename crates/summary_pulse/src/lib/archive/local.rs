use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Utc;
use summary_datastore::{StructuredSummary, VideoMetadata};
use tokio::{fs, io::AsyncWriteExt};

use super::{ArchiveDocument, ArchiveError, ArchiveStore};

/// Archive objects stored as files below a root directory
#[derive(Debug, Clone)]
pub struct LocalArchive {
    root: PathBuf,
}

impl LocalArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_new(&self, object: &str, body: &[u8]) -> Result<PathBuf, ArchiveError> {
        let path = std::path::absolute(self.root.join(object))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ArchiveError::AlreadyExists {
                    object: object.to_string(),
                },
                ErrorKind::PermissionDenied => ArchiveError::PermissionDenied {
                    object: object.to_string(),
                    message: e.to_string(),
                },
                _ => ArchiveError::Io(e),
            })?;

        write_or_discard(file, &path, body).await?;

        Ok(path)
    }
}

/// Writes and fsyncs `body`. On failure the partially written file at `path`
/// is removed so the object name stays free.
async fn write_or_discard(mut file: fs::File, path: &Path, body: &[u8]) -> std::io::Result<()> {
    let written = match file.write_all(body).await {
        Ok(()) => file.sync_all().await,
        Err(e) => Err(e),
    };
    drop(file);

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(path).await {
            tracing::warn!(
                error = %cleanup,
                path = %path.display(),
                "Failed to remove partially written archive file"
            );
        }
        return Err(e);
    }

    Ok(())
}

impl ArchiveStore for LocalArchive {
    #[tracing::instrument(skip(self, summary, metadata), fields(root = %self.root.display()))]
    async fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Result<String, ArchiveError> {
        let document = ArchiveDocument::new(video_id, summary, metadata, Utc::now());
        let object = document.object_name();
        let body = document.to_json()?;

        let path = self.write_new(&object, &body).await?;
        let address = path.display().to_string();
        tracing::info!(%address, "Archived summary");

        Ok(address)
    }
}
