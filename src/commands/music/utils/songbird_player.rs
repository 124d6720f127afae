use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::ControlError;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::commands::music::audio_sources::{track_metadata::QueueEntry, transcoder::Transcoder};
use crate::config::Config;

use super::event_handlers::TrackEndNotifier;
use super::music_manager::{MusicError, MusicResult};
use super::playback::{PlaybackHandle, VoicePlayer};

/// Plays queue entries on songbird voice connections.
pub struct SongbirdPlayer {
    songbird: Arc<Songbird>,
    playback: PlaybackHandle,
    transcoder: Transcoder,
    // Handle of the most recently started track per guild
    tracks: DashMap<GuildId, TrackHandle>,
}

impl SongbirdPlayer {
    pub fn new(songbird: Arc<Songbird>, playback: PlaybackHandle, config: &Config) -> Self {
        Self {
            songbird,
            playback,
            transcoder: Transcoder::from_config(config),
            tracks: DashMap::new(),
        }
    }

    fn current_track(&self, guild_id: GuildId) -> Option<TrackHandle> {
        self.tracks.get(&guild_id).map(|track| track.clone())
    }

    /// Play mode of the current track, `None` when there is no live track.
    async fn play_mode(&self, guild_id: GuildId) -> Option<PlayMode> {
        let track = self.current_track(guild_id)?;
        track.get_info().await.ok().map(|info| info.playing)
    }

    fn control<F>(&self, guild_id: GuildId, action: F) -> MusicResult<()>
    where
        F: FnOnce(&TrackHandle) -> Result<(), ControlError>,
    {
        let track = self
            .current_track(guild_id)
            .ok_or(MusicError::NothingPlaying)?;
        action(&track).map_err(|e| MusicError::ControlError(e.to_string()))
    }
}

/// Pausing requires an audible track.
pub fn check_pause(mode: Option<&PlayMode>) -> MusicResult<()> {
    match mode {
        Some(PlayMode::Play) => Ok(()),
        _ => Err(MusicError::NothingPlaying),
    }
}

/// Resuming requires a paused track.
pub fn check_resume(mode: Option<&PlayMode>) -> MusicResult<()> {
    match mode {
        Some(PlayMode::Pause) => Ok(()),
        _ => Err(MusicError::NotPaused),
    }
}

/// Skipping requires an audible track; a paused one has to be resumed first.
pub fn check_skip(mode: Option<&PlayMode>) -> MusicResult<()> {
    match mode {
        Some(PlayMode::Play) => Ok(()),
        _ => Err(MusicError::NothingToSkip),
    }
}

#[async_trait]
impl VoicePlayer for SongbirdPlayer {
    fn is_connected(&self, guild_id: GuildId) -> bool {
        self.songbird.get(guild_id).is_some()
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    async fn start(
        &self,
        guild_id: GuildId,
        generation: u64,
        entry: &QueueEntry,
    ) -> MusicResult<()> {
        let call = self
            .songbird
            .get(guild_id)
            .ok_or(MusicError::NotConnected)?;

        let input = self.transcoder.spawn(&entry.metadata.stream_url)?;

        let track = {
            let mut handler = call.lock().await;
            handler.play_only_input(input)
        };
        debug!("Track {} handle created for '{}'", generation, entry.title());

        // Both fire for the same track at most once; the loop drops the duplicate
        for event in [TrackEvent::End, TrackEvent::Error] {
            let notifier = TrackEndNotifier {
                guild_id,
                generation,
                playback: self.playback.clone(),
            };
            if let Err(e) = track.add_event(Event::Track(event), notifier) {
                warn!("Failed to attach end handler for guild {}: {}", guild_id, e);
            }
        }

        self.tracks.insert(guild_id, track);
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        let mode = self.play_mode(guild_id).await;
        check_pause(mode.as_ref())?;
        self.control(guild_id, |track| track.pause())
    }

    async fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        let mode = self.play_mode(guild_id).await;
        check_resume(mode.as_ref())?;
        self.control(guild_id, |track| track.play())
    }

    async fn skip(&self, guild_id: GuildId) -> MusicResult<()> {
        let mode = self.play_mode(guild_id).await;
        check_skip(mode.as_ref())?;
        self.control(guild_id, |track| track.stop())
    }

    async fn is_live(&self, guild_id: GuildId) -> bool {
        matches!(
            self.play_mode(guild_id).await,
            Some(PlayMode::Play) | Some(PlayMode::Pause)
        )
    }

    async fn halt(&self, guild_id: GuildId) {
        if let Some((_, track)) = self.tracks.remove(&guild_id) {
            match track.stop() {
                Ok(_) | Err(ControlError::Finished) => (),
                Err(e) => warn!("Error stopping track in guild {}: {}", guild_id, e),
            }
        }
    }

    async fn disconnect(&self, guild_id: GuildId) -> MusicResult<()> {
        self.tracks.remove(&guild_id);

        if self.songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        self.songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::LeaveError(e.to_string()))?;

        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }
}
