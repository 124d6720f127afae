use super::*;
use crate::commands::music::utils::{
    button_controls::Control,
    music_manager::{MusicError, MusicManager},
};
use tracing::info;

/// Skips the current song
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    // Stopping the track fires its end event, which starts the next one
    let reply = match MusicManager::apply_control(ctx.data(), guild_id, Control::Skip).await {
        Ok(confirmation) => {
            info!("{} skipped a track in guild {}", ctx.author().name, guild_id);
            confirmation.to_string()
        }
        Err(err) => err.to_string(),
    };
    ctx.say(reply).await?;

    Ok(())
}
