use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use thiserror::Error;
use tracing::info;

use crate::Data;

use super::button_controls::Control;

/// Errors that can occur during music operations.
///
/// The display text of each variant is what the user sees in chat.
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("This command can only be used in a server.")]
    NotInGuild,

    #[error("You need to be in a voice channel to use this command.")]
    UserNotInVoiceChannel,

    #[error("I'm not connected to a voice channel.")]
    NotConnected,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to leave voice channel: {0}")]
    LeaveError(String),

    #[error("Nothing is currently playing.")]
    NothingPlaying,

    #[error("The playback is not paused.")]
    NotPaused,

    #[error("Nothing is playing to skip.")]
    NothingToSkip,

    #[error("Couldn't find any song matching that query.")]
    NoResults,

    #[error("An error occurred: {0}")]
    AudioSourceError(String),

    #[error("Failed to start the audio stream: {0}")]
    StreamError(String),

    #[error("Playback control failed: {0}")]
    ControlError(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Entry points shared by the chat commands and the player buttons
pub struct MusicManager;

impl MusicManager {
    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// Apply a transport control to the guild's playback and return the confirmation text.
    ///
    /// Pause, resume and skip only touch the live track. Stop always clears the
    /// queue, then asks the playback loop to halt and disconnect.
    pub async fn apply_control(
        data: &Data,
        guild_id: GuildId,
        control: Control,
    ) -> MusicResult<&'static str> {
        match control {
            Control::Pause => data.player.pause(guild_id).await?,
            Control::Resume => data.player.resume(guild_id).await?,
            Control::Skip => data.player.skip(guild_id).await?,
            Control::Stop => {
                data.queues.clear(guild_id);
                if !data.player.is_connected(guild_id) {
                    return Err(MusicError::NotConnected);
                }
                data.playback.stop(guild_id);
            }
        }

        info!("Applied {:?} for guild {}", control, guild_id);
        Ok(control.confirmation())
    }
}
