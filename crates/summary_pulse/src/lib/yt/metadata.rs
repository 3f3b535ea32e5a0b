use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use summary_datastore::VideoMetadata;

use crate::yt::MetadataSource;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// YouTube Data API v3 client for video snippets
#[derive(Debug, Clone)]
pub struct YtDataClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    channel_id: String,
}

impl From<VideoSnippet> for VideoMetadata {
    fn from(snippet: VideoSnippet) -> Self {
        VideoMetadata {
            title: snippet.title,
            description: snippet.description,
            channel_title: snippet.channel_title,
            channel_id: snippet.channel_id,
        }
    }
}

impl YtDataClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: "https://www.googleapis.com/youtube/v3".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The key travels in a header so it never shows up in request URLs,
    /// which reqwest embeds in its error messages
    fn snippet_request(&self, video_id: &str, api_key: &str) -> RequestBuilder {
        self.http_client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "snippet"), ("id", video_id)])
            .header(API_KEY_HEADER, api_key)
    }

    async fn request_snippet(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<Option<VideoMetadata>, reqwest::Error> {
        let response = self
            .snippet_request(video_id, api_key)
            .send()
            .await?
            .error_for_status()?
            .json::<VideoListResponse>()
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet.into()))
    }
}

impl MetadataSource for YtDataClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_metadata(&self, video_id: &str) -> VideoMetadata {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("YouTube API key not configured, skipping metadata lookup");
            return VideoMetadata::default();
        };

        match self.request_snippet(video_id, api_key).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                tracing::warn!("Video not found in YouTube Data API");
                VideoMetadata::default()
            }
            Err(e) if e.status() == Some(StatusCode::FORBIDDEN) => {
                tracing::warn!(
                    error = %e.without_url(),
                    "API key lacks access to YouTube Data API v3, enable it in the cloud console"
                );
                VideoMetadata::default()
            }
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "Failed to fetch video metadata");
                VideoMetadata::default()
            }
        }
    }
}
