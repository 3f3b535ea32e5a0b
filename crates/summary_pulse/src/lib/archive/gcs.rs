use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode};
use summary_datastore::{StructuredSummary, VideoMetadata};

use super::{ArchiveDocument, ArchiveError, ArchiveStore};

/// Google Cloud Storage bucket written through the JSON API media upload
#[derive(Debug, Clone)]
pub struct GcsArchive {
    client: Client,
    bucket: String,
    access_token: String,
    base_url: String,
}

impl GcsArchive {
    pub fn new(bucket: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            access_token: access_token.into(),
            base_url: "https://storage.googleapis.com".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Media upload of `body` as `object`. `ifGenerationMatch=0` makes the
    /// upload fail instead of replacing an existing object.
    fn upload_request(&self, object: &str, body: Vec<u8>) -> RequestBuilder {
        self.client
            .post(format!(
                "{}/upload/storage/v1/b/{}/o",
                self.base_url, self.bucket
            ))
            .query(&[
                ("uploadType", "media"),
                ("name", object),
                ("ifGenerationMatch", "0"),
            ])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
    }

    async fn upload(&self, object: &str, body: Vec<u8>) -> Result<String, ArchiveError> {
        let resp = self
            .upload_request(object, body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(format!("gs://{}/{}", self.bucket, object));
        }

        let message = resp.text().await.unwrap_or_default();
        Err(upload_error(status, object, &self.bucket, message))
    }
}

fn upload_error(status: StatusCode, object: &str, bucket: &str, message: String) -> ArchiveError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ArchiveError::PermissionDenied {
            object: object.to_string(),
            message,
        },
        StatusCode::NOT_FOUND => ArchiveError::BucketNotFound {
            bucket: bucket.to_string(),
        },
        StatusCode::PRECONDITION_FAILED => ArchiveError::AlreadyExists {
            object: object.to_string(),
        },
        _ => ArchiveError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

impl ArchiveStore for GcsArchive {
    #[tracing::instrument(skip(self, summary, metadata), fields(bucket = %self.bucket))]
    async fn save(
        &self,
        video_id: &str,
        summary: &StructuredSummary,
        metadata: &VideoMetadata,
    ) -> Result<String, ArchiveError> {
        let document = ArchiveDocument::new(video_id, summary, metadata, Utc::now());
        let object = document.object_name();
        let body = document.to_json()?;

        let address = self.upload(&object, body).await?;
        tracing::info!(%address, "Archived summary");

        Ok(address)
    }
}
