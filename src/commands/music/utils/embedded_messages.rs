use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{CreateEmbed, CreateEmbedFooter, Mentionable};

use crate::commands::music::audio_sources::track_metadata::QueueEntry;

use super::{format_duration, music_manager::MusicError};

/// Maximum number of entries listed by the queue command
pub const QUEUE_DISPLAY_LIMIT: usize = 10;

const GREEN: u32 = 0x00ff00;
const BLUE: u32 = 0x3498db;
const PURPLE: u32 = 0x9b59b6;
const ORANGE: u32 = 0xe67e22;
const RED: u32 = 0xff0000;

/// `**[title](url)**` for an entry
fn linked_title(entry: &QueueEntry) -> String {
    format!("**[{}]({})**", entry.title(), entry.metadata.link())
}

fn with_thumbnail(embed: CreateEmbed, entry: &QueueEntry) -> CreateEmbed {
    match &entry.metadata.thumbnail {
        Some(thumbnail) => embed.thumbnail(thumbnail),
        None => embed,
    }
}

/// Create an embed for when a song starts playing
pub fn now_playing(entry: &QueueEntry) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(linked_title(entry))
        .field("Requested by", entry.requested_by.mention().to_string(), true)
        .color(GREEN);

    if let Some(duration) = entry.metadata.duration {
        embed = embed.field("Duration", format!("`{}`", format_duration(duration)), true);
    }

    with_thumbnail(embed, entry)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(entry: &QueueEntry, position: usize) -> CreateReply {
    let embed = CreateEmbed::new()
        .title("✅ Added to Queue")
        .description(linked_title(entry))
        .field("Position in queue", position.to_string(), true)
        .color(BLUE);

    CreateReply::default().embed(with_thumbnail(embed, entry))
}

/// Description lines and footer for the queue listing.
///
/// `shown` is the head of the queue, `total` its true length.
pub fn queue_listing(shown: &[QueueEntry], total: usize) -> (String, String) {
    let description = shown
        .iter()
        .take(QUEUE_DISPLAY_LIMIT)
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "`{}.` [{}]({}) | Requested by {}\n",
                index + 1,
                entry.title(),
                entry.metadata.link(),
                entry.requested_by.mention()
            )
        })
        .collect::<String>();

    let count = shown.len().min(QUEUE_DISPLAY_LIMIT);
    let footer = format!("Showing {} of {} songs.", count, total);

    (description, footer)
}

/// Create an embed listing the head of the queue
pub fn music_queue(shown: &[QueueEntry], total: usize) -> CreateReply {
    if total == 0 {
        return queue_is_empty();
    }

    let (description, footer) = queue_listing(shown, total);

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎶 Current Queue")
            .description(description)
            .footer(CreateEmbedFooter::new(footer))
            .color(PURPLE),
    )
}

/// Create an embed for when the queue is empty
pub fn queue_is_empty() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .description("The queue is currently empty.")
            .color(ORANGE),
    )
}

/// Create an embed for when the queue has drained and the bot leaves
pub fn queue_finished() -> CreateEmbed {
    CreateEmbed::new()
        .description("✅ Queue finished! I'm leaving the channel.")
        .color(BLUE)
}

/// Create an embed for a track that could not be started
pub fn track_failed(entry: &QueueEntry, err: &MusicError) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚠️ Skipped")
        .description(format!(
            "Couldn't play {}: {}",
            linked_title(entry),
            err
        ))
        .color(ORANGE)
}

/// Create an embed for a failed music operation
pub fn music_error(err: &MusicError) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(err.to_string())
            .color(RED),
    )
}
