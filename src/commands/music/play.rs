use super::*;
use crate::commands::music::audio_sources::track_metadata::QueueEntry;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{MusicError, MusicManager},
};
use tracing::{error, info};

/// Search YouTube (or take a URL) and add the first result to the queue
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[rest]
    #[description = "Search text or URL"]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;
    let data = ctx.data();

    // Get the user's voice channel
    let voice_channel_id = match MusicManager::get_user_voice_channel(
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

    ctx.say(format!("🔎 Searching for: **{}**...", query)).await?;

    let metadata = match data.search.search(&query).await {
        Ok(metadata) => metadata,
        Err(err) => {
            error!("Search for '{}' failed: {}", query, err);
            ctx.say(err.to_string()).await?;
            return Ok(());
        }
    };

    // Join the voice channel if not already connected
    if !data.player.is_connected(guild_id) {
        if let Err(err) = data.player.join(guild_id, voice_channel_id).await {
            ctx.send(embedded_messages::music_error(&err)).await?;
            return Ok(());
        }
    }

    let entry = QueueEntry::new(metadata, ctx.author().id);
    let position = data.queues.enqueue(guild_id, entry.clone());
    info!(
        "Queued '{}' for guild {} at position {}",
        entry.title(),
        guild_id,
        position
    );

    ctx.send(embedded_messages::added_to_queue(&entry, position))
        .await?;

    // Starts playback if the guild is idle, otherwise the track just waits its turn
    data.playback
        .enqueued(guild_id, ctx.channel_id(), voice_channel_id);

    Ok(())
}
