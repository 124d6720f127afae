//! Cadence: a guild-scoped Discord music bot.
//!
//! Commands enqueue YouTube tracks into a per-guild [`QueueStore`] and a single
//! playback task advances each guild's queue whenever the voice driver reports
//! that a track has ended.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use songbird::Songbird;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::audio_sources::{TrackSearch, youtube::YoutubeApi};
use commands::music::utils::{
    notifier::ChannelNotifier,
    playback::{PlaybackHandle, PlaybackLoop, VoicePlayer},
    queue_store::QueueStore,
    songbird_player::SongbirdPlayer,
};
use config::Config;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: Arc<Config>,
    pub queues: QueueStore,
    pub playback: PlaybackHandle,
    pub player: Arc<dyn VoicePlayer>,
    pub search: Arc<dyn TrackSearch>,
}

impl Data {
    /// Wire the music services together and spawn the playback loop.
    pub fn start(http: Arc<serenity::Http>, songbird: Arc<Songbird>, config: Arc<Config>) -> Self {
        let queues = QueueStore::default();
        let (playback, events) = PlaybackHandle::channel();

        let player: Arc<dyn VoicePlayer> =
            Arc::new(SongbirdPlayer::new(songbird, playback.clone(), &config));
        let notifier = Arc::new(ChannelNotifier::new(http));

        let playback_loop = PlaybackLoop::new(queues.clone(), player.clone(), notifier);
        tokio::spawn(playback_loop.run(events));

        Self {
            search: Arc::new(YoutubeApi::new(config.ytdl_format.clone())),
            config,
            queues,
            playback,
            player,
        }
    }
}
