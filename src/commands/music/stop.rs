use super::*;
use crate::commands::music::utils::{
    button_controls::Control,
    music_manager::{MusicError, MusicManager},
};
use tracing::warn;

/// Stops playback, clears the queue, and disconnects
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let reply = match MusicManager::apply_control(ctx.data(), guild_id, Control::Stop).await {
        Ok(confirmation) => confirmation.to_string(),
        Err(err) => {
            warn!("Stop requested in guild {} failed: {}", guild_id, err);
            err.to_string()
        }
    };
    ctx.say(reply).await?;

    Ok(())
}
