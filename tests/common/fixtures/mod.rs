//! Sample data used across the test files

use cadence::commands::music::audio_sources::track_metadata::{QueueEntry, TrackMetadata};
use fake::{Fake, faker::lorem::en::Sentence};
use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use std::time::Duration;

pub const SAMPLE_GUILD_ID: u64 = 123456789;
pub const SAMPLE_CHANNEL_ID: u64 = 987654321;
pub const SAMPLE_VOICE_CHANNEL_ID: u64 = 192837465;
pub const SAMPLE_USER_ID: u64 = 555555555;

pub fn guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID)
}

pub fn channel() -> ChannelId {
    ChannelId::new(SAMPLE_CHANNEL_ID)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(SAMPLE_VOICE_CHANNEL_ID)
}

/// A queue entry with a fixed title
pub fn entry(title: &str) -> QueueEntry {
    QueueEntry::new(
        TrackMetadata {
            title: title.to_string(),
            stream_url: format!("https://stream.example/{}", title.replace(' ', "-")),
            page_url: Some(format!("https://www.youtube.com/watch?v={}", title.len())),
            thumbnail: None,
            duration: Some(Duration::from_secs(180)),
        },
        UserId::new(SAMPLE_USER_ID),
    )
}

/// A queue entry with a random title
pub fn random_entry() -> QueueEntry {
    let title: String = Sentence(1..4).fake();
    entry(&title)
}
