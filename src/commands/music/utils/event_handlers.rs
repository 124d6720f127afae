use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::tracks::PlayMode;
use tracing::{debug, warn};

use super::playback::PlaybackHandle;

/// Event handler for when a track ends, errors, or is stopped.
///
/// Runs on songbird's event thread, so it only posts to the playback loop.
pub struct TrackEndNotifier {
    pub guild_id: serenity::GuildId,
    pub generation: u64,
    pub playback: PlaybackHandle,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            let failure = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(e.to_string()),
                _ => None,
            });

            match failure {
                Some(reason) => {
                    warn!(
                        "Track {} errored in guild {}: {}",
                        self.generation, self.guild_id, reason
                    );
                    self.playback
                        .track_failed(self.guild_id, self.generation, reason);
                }
                None => {
                    debug!(
                        "Track {} signalled end for guild {}",
                        self.generation, self.guild_id
                    );
                    self.playback
                        .track_finished(self.guild_id, self.generation);
                }
            }
        }
        None
    }
}
