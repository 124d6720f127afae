use poise::serenity_prelude as serenity;
use serenity::all::{CreateEmbed, CreateMessage};
use serenity::async_trait;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::warn;

use crate::commands::music::audio_sources::track_metadata::QueueEntry;

use super::button_controls::create_music_control_buttons;
use super::embedded_messages;
use super::music_manager::MusicError;
use super::playback::PlaybackNotifier;

/// Posts playback updates into the text channel a session was started from.
pub struct ChannelNotifier {
    http: Arc<serenity::Http>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    async fn send(&self, channel_id: ChannelId, message: CreateMessage) {
        if let Err(e) = channel_id.send_message(&self.http, message).await {
            warn!("Failed to send playback update to channel {}: {}", channel_id, e);
        }
    }

    async fn send_embed(&self, channel_id: ChannelId, embed: CreateEmbed) {
        self.send(channel_id, CreateMessage::new().embed(embed)).await;
    }
}

#[async_trait]
impl PlaybackNotifier for ChannelNotifier {
    async fn now_playing(&self, channel_id: ChannelId, entry: &QueueEntry) {
        let message = CreateMessage::new()
            .embed(embedded_messages::now_playing(entry))
            .components(create_music_control_buttons());
        self.send(channel_id, message).await;
    }

    async fn track_failed(&self, channel_id: ChannelId, entry: &QueueEntry, error: &MusicError) {
        self.send_embed(channel_id, embedded_messages::track_failed(entry, error))
            .await;
    }

    async fn queue_finished(&self, channel_id: ChannelId) {
        self.send_embed(channel_id, embedded_messages::queue_finished())
            .await;
    }
}
