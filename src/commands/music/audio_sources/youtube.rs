//! Implements `TrackSearch` for YouTube.
//! Uses the `yt-dlp` command-line tool for searching and stream extraction.

use serenity::async_trait;
use std::process::{Command, Output};
use tracing::{debug, info, warn};

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};

use super::{AudioSource, TrackSearch, track_metadata::TrackMetadata};

/// Searches YouTube through `yt-dlp`.
pub struct YoutubeApi {
    /// Format selector passed to `-f`
    format: String,
}

impl YoutubeApi {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    /// The `yt-dlp` target: URLs are passed through, anything else becomes a
    /// single-result YouTube search.
    pub fn search_target(query: &str) -> String {
        let query = query.trim();
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch1:{}", query)
        }
    }

    /// Arguments for a metadata-only `yt-dlp` run on `query`.
    pub fn ytdlp_args(&self, query: &str) -> Vec<String> {
        vec![
            "-j".to_string(),            // Output as JSON
            "--no-playlist".to_string(), // Don't process playlists
            "--no-warnings".to_string(),
            "-f".to_string(),
            self.format.clone(),
            Self::search_target(query),
        ]
    }

    fn run_ytdlp(args: Vec<String>) -> MusicResult<Output> {
        Command::new("yt-dlp").args(args).output().map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to run yt-dlp: {}", e))
        })
    }
}

#[async_trait]
impl TrackSearch for YoutubeApi {
    async fn search(&self, query: &str) -> MusicResult<TrackMetadata> {
        info!("Searching YouTube for: {}", query);
        let args = self.ytdlp_args(query);

        // yt-dlp blocks on network I/O, keep it off the async workers
        let output = tokio::task::spawn_blocking(move || Self::run_ytdlp(args))
            .await
            .map_err(|e| MusicError::AudioSourceError(format!("Search task failed: {}", e)))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp exited with {}: {}", output.status, stderr.trim());
            return Err(MusicError::AudioSourceError(
                stderr
                    .lines()
                    .last()
                    .unwrap_or("yt-dlp failed")
                    .to_string(),
            ));
        }

        let metadata = TrackMetadata::from_ytdlp_output(&stdout)?;
        debug!("Resolved '{}' to '{}'", query, metadata.title);
        Ok(metadata)
    }
}
