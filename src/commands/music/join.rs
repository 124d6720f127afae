use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{MusicError, MusicManager},
};
use poise::serenity_prelude::Mentionable;
use tracing::info;

/// Makes the bot join the voice channel you are in
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let channel_id = match MusicManager::get_user_voice_channel(
        ctx.serenity_context(),
        guild_id,
        ctx.author().id,
    ) {
        Ok(channel_id) => channel_id,
        Err(err) => {
            ctx.send(embedded_messages::music_error(&err)).await?;
            return Ok(());
        }
    };

    if let Err(err) = ctx.data().player.join(guild_id, channel_id).await {
        ctx.send(embedded_messages::music_error(&err)).await?;
        return Ok(());
    }

    info!("Joined {} on request of {}", channel_id, ctx.author().name);
    ctx.say(format!("✅ Connected to: {}", channel_id.mention()))
        .await?;

    Ok(())
}
