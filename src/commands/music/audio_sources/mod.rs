//! Resolving user input into playable audio.
//!
//! Search goes through the [`TrackSearch`] trait (implemented for YouTube via
//! `yt-dlp`), and the resolved stream is turned into a songbird input by the
//! ffmpeg [`transcoder`].

/// Submodule defining `TrackMetadata` and `QueueEntry`.
pub mod track_metadata;
/// Submodule wrapping the external ffmpeg process.
pub mod transcoder;
/// Submodule implementing `TrackSearch` for YouTube.
pub mod youtube;

use crate::commands::music::utils::music_manager::MusicResult;
use serenity::async_trait;
use track_metadata::TrackMetadata;
use url::Url;

/// Resolves a free-text query (or a URL) to a single playable track.
///
/// Requires `Send + Sync` so it can live in the shared bot data.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    /// Returns the best match, `MusicError::NoResults` when nothing matched,
    /// or `MusicError::AudioSourceError` when the extractor failed.
    async fn search(&self, query: &str) -> MusicResult<TrackMetadata>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as an http(s) URL.
    /// Does not validate if the URL is actually reachable.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input.trim()).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}
