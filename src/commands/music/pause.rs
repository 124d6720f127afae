use super::*;
use crate::commands::music::utils::{
    button_controls::Control,
    music_manager::{MusicError, MusicManager},
};

/// Pauses the current song
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let reply = match MusicManager::apply_control(ctx.data(), guild_id, Control::Pause).await {
        Ok(confirmation) => confirmation.to_string(),
        Err(err) => err.to_string(),
    };
    ctx.say(reply).await?;

    Ok(())
}
