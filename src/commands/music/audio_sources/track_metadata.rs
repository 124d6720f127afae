//! Defines `TrackMetadata`, the resolved result of a search, and `QueueEntry`,
//! one requested track sitting in a guild queue.

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use serde::Deserialize;
use serenity::model::id::UserId;
use std::time::Duration;

/// Placeholder shown when the extractor reports no title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// Directly playable media location handed to the transcoder.
    pub stream_url: String,
    /// Canonical page for the track (e.g. the YouTube watch URL), if available.
    pub page_url: Option<String>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The duration of the track, if available.
    pub duration: Option<Duration>,
}

/// The subset of `yt-dlp --dump-json` output we care about.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    url: Option<String>,
    thumbnail: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
}

impl TrackMetadata {
    /// Parses the JSON-lines output of `yt-dlp -j`, keeping the first result.
    ///
    /// Blank output means the search matched nothing.
    pub fn from_ytdlp_output(output: &str) -> MusicResult<Self> {
        let first_line = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(MusicError::NoResults)?;

        let info: YtDlpInfo = serde_json::from_str(first_line).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
        })?;

        let stream_url = info
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| MusicError::AudioSourceError("No playable stream found".to_string()))?;

        Ok(Self {
            title: info
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            stream_url,
            page_url: info.webpage_url,
            thumbnail: info.thumbnail,
            duration: info
                .duration
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        })
    }

    /// Link target for embeds; `#` keeps markdown links valid when no page is known.
    pub fn link(&self) -> &str {
        self.page_url.as_deref().unwrap_or("#")
    }
}

/// One requested track waiting in (or dequeued from) a guild queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub metadata: TrackMetadata,
    pub requested_by: UserId,
}

impl QueueEntry {
    pub fn new(metadata: TrackMetadata, requested_by: UserId) -> Self {
        Self {
            metadata,
            requested_by,
        }
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }
}
