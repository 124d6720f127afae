use super::*;
use crate::commands::music::utils::{
    embedded_messages::{self, QUEUE_DISPLAY_LIMIT},
    music_manager::MusicError,
};

/// Displays the upcoming songs
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let (shown, total) = ctx.data().queues.snapshot(guild_id, QUEUE_DISPLAY_LIMIT);
    ctx.send(embedded_messages::music_queue(&shown, total))
        .await?;

    Ok(())
}
