//! # Yt Parser
//!
//! Helpers for pulling caption data out of YouTube pages: video id extraction
//! from the many URL shapes, the `ytInitialPlayerResponse` blob embedded in a
//! watch page, caption track selection and the `json3` timed-text format.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{error::Error, Transcript, TranscriptChunk};

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)")
        .unwrap()
});

static YT_VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtu\.be/|youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/|live/))([A-Za-z0-9_-]{11})",
    )
    .unwrap()
});

static YT_VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Extracts the 11 character video id from a watch/short/embed URL or
/// accepts a bare id.
pub fn extract_video_id(url_or_id: &str) -> Result<String, Error> {
    let input = url_or_id.trim();

    if YT_VIDEO_ID_RE.is_match(input) {
        return Ok(input.to_string());
    }

    YT_VIDEO_URL_RE
        .captures(input)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(Error::ParseError(
            "Input is neither a YouTube video URL nor a video id",
        ))
}

pub struct YtHtmlDocument(String);

impl Deref for YtHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtHtmlDocument {
    pub fn new(doc: String) -> Self {
        YtHtmlDocument(doc)
    }

    /// Deserializes the `ytInitialPlayerResponse` script data of a watch page
    pub fn player_response<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        YT_PLAYER_RESPONSE_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or(Error::ParseError(
                "Failed to extract ytInitialPlayerResponse from the page's script tag",
            ))
    }
}

impl From<String> for YtHtmlDocument {
    fn from(value: String) -> Self {
        YtHtmlDocument(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    /// Automatic speech recognition tracks are marked with `kind: "asr"`
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches_language(&self, language: &str) -> bool {
        self.language_code == language
            || self
                .language_code
                .strip_prefix(language)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

/// Caption tracks listed in a player response. `None` means the video has
/// captions turned off altogether.
pub fn caption_tracks(player_response: &Value) -> Option<Vec<CaptionTrack>> {
    let tracks = player_response["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()?;

    Some(
        tracks
            .iter()
            .filter_map(|track| serde_json::from_value::<CaptionTrack>(track.clone()).ok())
            .collect(),
    )
}

/// Picks a track following the language preference order. Within a language
/// manually created captions win over generated ones.
pub fn select_caption_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|language| {
        let mut candidates = tracks.iter().filter(|t| t.matches_language(language));
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Converts a `fmt=json3` timed-text document into transcript chunks.
/// Events without text (window setup, bare line breaks) are dropped.
pub fn parse_timed_text(json: &str) -> Result<Transcript, Error> {
    let timed_text: TimedText = serde_json::from_str(json)?;

    let chunks = timed_text
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ");
            let text = text.trim();

            (!text.is_empty()).then(|| TranscriptChunk {
                text: text.to_string(),
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect::<Vec<_>>();

    Ok(Transcript::new(chunks))
}
