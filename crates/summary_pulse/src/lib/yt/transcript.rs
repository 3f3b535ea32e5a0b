use reqwest::Client;
use serde_json::Value;

use crate::{
    error::TranscriptError,
    parser::{caption_tracks, parse_timed_text, select_caption_track, YtHtmlDocument},
    yt::TranscriptSource,
    Transcript,
};

/// Reads the caption tracks YouTube publishes for a video
#[derive(Debug, Clone)]
pub struct YtTranscriptClient {
    http_client: Client,
    languages: Vec<String>,
}

impl Default for YtTranscriptClient {
    fn default() -> Self {
        Self::new(["ja", "en"])
    }
}

impl YtTranscriptClient {
    const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

    /// `languages` is the preference order used to pick a caption track
    pub fn new<L: Into<String>>(languages: impl IntoIterator<Item = L>) -> Self {
        Self {
            http_client: Client::new(),
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<YtHtmlDocument, TranscriptError> {
        let html = self
            .http_client
            .get(Self::YOUTUBE_WATCH_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html.into())
    }
}

impl TranscriptSource for YtTranscriptClient {
    #[tracing::instrument(skip(self), fields(languages = ?self.languages))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript, TranscriptError> {
        let doc = self.fetch_watch_page(video_id).await?;
        let player_response = doc.player_response::<Value>()?;

        let tracks = caption_tracks(&player_response).ok_or_else(|| TranscriptError::Disabled {
            video_id: video_id.to_string(),
        })?;

        let track = select_caption_track(&tracks, &self.languages).ok_or_else(|| {
            TranscriptError::NotAvailable {
                video_id: video_id.to_string(),
                languages: self.languages.clone(),
            }
        })?;
        tracing::debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let body = self
            .http_client
            .get(&track.base_url)
            .query(&[("fmt", "json3")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let transcript = parse_timed_text(&body)?;
        tracing::info!(chunks = transcript.len(), "Fetched transcript");

        Ok(transcript)
    }
}
