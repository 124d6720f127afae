use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::commands::music::audio_sources::track_metadata::QueueEntry;

/// Per-guild FIFO queues of requested tracks.
///
/// Cheap to clone; every clone shares the same map. Each guild's queue is
/// guarded by its `DashMap` shard, so commands running on different threads
/// can enqueue for the same guild safely.
#[derive(Clone, Default)]
pub struct QueueStore {
    queues: Arc<DashMap<GuildId, VecDeque<QueueEntry>>>,
}

impl QueueStore {
    /// Append a track, creating the guild's queue if needed.
    /// Returns the queue length after insertion, which is the track's position.
    pub fn enqueue(&self, guild_id: GuildId, entry: QueueEntry) -> usize {
        let mut queue = self.queues.entry(guild_id).or_default();
        queue.push_back(entry);
        debug!("Queued track for guild {} at position {}", guild_id, queue.len());
        queue.len()
    }

    /// Remove and return the next track, if any.
    pub fn dequeue_front(&self, guild_id: GuildId) -> Option<QueueEntry> {
        self.queues
            .get_mut(&guild_id)
            .and_then(|mut queue| queue.pop_front())
    }

    /// Empty the guild's queue. Calling it on an empty or unknown guild is a no-op.
    pub fn clear(&self, guild_id: GuildId) {
        if let Some(mut queue) = self.queues.get_mut(&guild_id) {
            debug!("Clearing {} queued tracks for guild {}", queue.len(), guild_id);
            queue.clear();
        }
    }

    /// Number of tracks waiting in the guild's queue
    pub fn len(&self, guild_id: GuildId) -> usize {
        self.queues.get(&guild_id).map_or(0, |queue| queue.len())
    }

    pub fn is_empty(&self, guild_id: GuildId) -> bool {
        self.len(guild_id) == 0
    }

    /// Up to `limit` tracks from the front of the queue, plus the full length.
    pub fn snapshot(&self, guild_id: GuildId, limit: usize) -> (Vec<QueueEntry>, usize) {
        self.queues
            .get(&guild_id)
            .map(|queue| (queue.iter().take(limit).cloned().collect(), queue.len()))
            .unwrap_or_default()
    }

    /// Drop the guild's map entry if its queue is empty. Returns whether it was removed.
    pub fn evict(&self, guild_id: GuildId) -> bool {
        let removed = self
            .queues
            .remove_if(&guild_id, |_, queue| queue.is_empty())
            .is_some();
        if removed {
            debug!("Evicted empty queue for guild {}", guild_id);
        }
        removed
    }

    /// Number of guilds currently holding a queue entry
    pub fn guild_count(&self) -> usize {
        self.queues.len()
    }
}
