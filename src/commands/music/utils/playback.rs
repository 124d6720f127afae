//! The playback continuation.
//!
//! A single task owns every guild's playback session and consumes
//! [`PlaybackEvent`]s. Commands post `Enqueued` and `Stop`; the voice driver's
//! track-end handler posts `TrackFinished` (or `TrackFailed` when the stream
//! broke) from songbird's own threads. Since
//! all session state lives in this one task, the continuation for a guild can
//! never run twice at once.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::music::audio_sources::track_metadata::QueueEntry;

use super::music_manager::{MusicError, MusicResult};
use super::queue_store::QueueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A track was queued from `channel_id` by a member of `voice_channel_id`;
    /// start playing if the guild is idle.
    Enqueued {
        guild_id: GuildId,
        channel_id: ChannelId,
        voice_channel_id: ChannelId,
    },
    /// The track started with `generation` ended (finished or skipped).
    TrackFinished { guild_id: GuildId, generation: u64 },
    /// The track started with `generation` broke off while streaming.
    TrackFailed {
        guild_id: GuildId,
        generation: u64,
        reason: String,
    },
    /// Halt playback and leave the voice channel.
    Stop { guild_id: GuildId },
}

/// Sending side of the playback loop's event channel.
#[derive(Clone, Debug)]
pub struct PlaybackHandle {
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl PlaybackHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    pub fn enqueued(&self, guild_id: GuildId, channel_id: ChannelId, voice_channel_id: ChannelId) {
        self.post(PlaybackEvent::Enqueued {
            guild_id,
            channel_id,
            voice_channel_id,
        });
    }

    pub fn track_finished(&self, guild_id: GuildId, generation: u64) {
        self.post(PlaybackEvent::TrackFinished {
            guild_id,
            generation,
        });
    }

    pub fn track_failed(&self, guild_id: GuildId, generation: u64, reason: String) {
        self.post(PlaybackEvent::TrackFailed {
            guild_id,
            generation,
            reason,
        });
    }

    pub fn stop(&self, guild_id: GuildId) {
        self.post(PlaybackEvent::Stop { guild_id });
    }

    fn post(&self, event: PlaybackEvent) {
        if let Err(e) = self.events.send(event) {
            warn!("Playback loop is not running, dropped {:?}", e.0);
        }
    }
}

/// The voice side of playback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoicePlayer: Send + Sync {
    /// Whether the bot holds a voice connection in the guild
    fn is_connected(&self, guild_id: GuildId) -> bool;

    /// Join `channel_id`, or move there if already connected elsewhere in the guild.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    /// Start streaming `entry` on the guild's voice connection, replacing any
    /// current track. The implementation must report the end of the stream
    /// with [`PlaybackHandle::track_finished`] or [`PlaybackHandle::track_failed`]
    /// carrying `generation`.
    async fn start(
        &self,
        guild_id: GuildId,
        generation: u64,
        entry: &QueueEntry,
    ) -> MusicResult<()>;

    async fn pause(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn resume(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Stop the current track so that its end event advances the queue.
    async fn skip(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Whether a track is currently playing or paused in the guild
    async fn is_live(&self, guild_id: GuildId) -> bool;

    /// Stop the current track without touching the connection
    async fn halt(&self, guild_id: GuildId);

    async fn disconnect(&self, guild_id: GuildId) -> MusicResult<()>;
}

/// Informational messages about playback progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackNotifier: Send + Sync {
    async fn now_playing(&self, channel_id: ChannelId, entry: &QueueEntry);

    async fn track_failed(&self, channel_id: ChannelId, entry: &QueueEntry, error: &MusicError);

    async fn queue_finished(&self, channel_id: ChannelId);
}

/// The track currently on a guild's connection
#[derive(Debug)]
struct NowPlaying {
    generation: u64,
    entry: QueueEntry,
}

/// Per-guild state of an active playback session
#[derive(Debug)]
struct Session {
    /// Where notifications for this session go
    channel_id: ChannelId,
    current: Option<NowPlaying>,
}

pub struct PlaybackLoop {
    queues: QueueStore,
    player: Arc<dyn VoicePlayer>,
    notifier: Arc<dyn PlaybackNotifier>,
    sessions: HashMap<GuildId, Session>,
    last_generation: u64,
}

impl PlaybackLoop {
    pub fn new(
        queues: QueueStore,
        player: Arc<dyn VoicePlayer>,
        notifier: Arc<dyn PlaybackNotifier>,
    ) -> Self {
        Self {
            queues,
            player,
            notifier,
            sessions: HashMap::new(),
            last_generation: 0,
        }
    }

    /// Consume events until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<PlaybackEvent>) {
        info!("Playback loop started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("Playback loop finished");
    }

    pub async fn handle(&mut self, event: PlaybackEvent) {
        debug!("Playback event: {:?}", event);
        match event {
            PlaybackEvent::Enqueued {
                guild_id,
                channel_id,
                voice_channel_id,
            } => {
                self.on_enqueued(guild_id, channel_id, voice_channel_id)
                    .await
            }
            PlaybackEvent::TrackFinished {
                guild_id,
                generation,
            } => self.on_track_finished(guild_id, generation).await,
            PlaybackEvent::TrackFailed {
                guild_id,
                generation,
                reason,
            } => self.on_track_failed(guild_id, generation, reason).await,
            PlaybackEvent::Stop { guild_id } => self.on_stop(guild_id).await,
        }
    }

    /// Whether the guild has a track on its connection, as far as the loop knows
    pub fn is_active(&self, guild_id: GuildId) -> bool {
        self.sessions
            .get(&guild_id)
            .is_some_and(|session| session.current.is_some())
    }

    async fn on_enqueued(
        &mut self,
        guild_id: GuildId,
        channel_id: ChannelId,
        voice_channel_id: ChannelId,
    ) {
        if self.is_active(guild_id) {
            if self.player.is_live(guild_id).await {
                debug!("Guild {} is already playing, track stays queued", guild_id);
                return;
            }
            // The end signal for the last track never arrived (e.g. the connection dropped)
            warn!("Recovering stalled session for guild {}", guild_id);
        }

        // The queue may have drained and disconnected while the request was being resolved
        if !self.player.is_connected(guild_id) {
            info!(
                "Rejoining voice channel {} for guild {}",
                voice_channel_id, guild_id
            );
            if let Err(e) = self.player.join(guild_id, voice_channel_id).await {
                warn!("Failed to rejoin voice in guild {}: {}", guild_id, e);
            }
        }

        self.sessions.insert(
            guild_id,
            Session {
                channel_id,
                current: None,
            },
        );
        self.advance(guild_id).await;
    }

    /// Clear and return the guild's current track if it carries `generation`.
    fn take_current(&mut self, guild_id: GuildId, generation: u64) -> Option<(ChannelId, QueueEntry)> {
        let session = self.sessions.get_mut(&guild_id)?;
        let current_generation = session.current.as_ref().map(|current| current.generation);
        if current_generation != Some(generation) {
            debug!(
                "Ignoring end of track {} for guild {} (current: {:?})",
                generation, guild_id, current_generation
            );
            return None;
        }

        let current = session.current.take()?;
        Some((session.channel_id, current.entry))
    }

    async fn on_track_finished(&mut self, guild_id: GuildId, generation: u64) {
        if self.take_current(guild_id, generation).is_none() {
            return;
        }

        info!("Track {} ended for guild {}", generation, guild_id);
        self.advance(guild_id).await;
    }

    async fn on_track_failed(&mut self, guild_id: GuildId, generation: u64, reason: String) {
        let Some((channel_id, entry)) = self.take_current(guild_id, generation) else {
            return;
        };

        warn!(
            "Track {} ('{}') failed in guild {}: {}",
            generation,
            entry.title(),
            guild_id,
            reason
        );
        self.notifier
            .track_failed(channel_id, &entry, &MusicError::StreamError(reason))
            .await;
        self.advance(guild_id).await;
    }

    async fn on_stop(&mut self, guild_id: GuildId) {
        // Removing the session first makes the halted track's end signal stale
        self.sessions.remove(&guild_id);
        self.queues.clear(guild_id);
        self.player.halt(guild_id).await;

        if let Err(e) = self.player.disconnect(guild_id).await {
            debug!("Disconnect during stop for guild {}: {}", guild_id, e);
        }
        self.queues.evict(guild_id);
        info!("Stopped playback for guild {}", guild_id);
    }

    /// Start the next playable entry, or end the session when the queue is drained.
    async fn advance(&mut self, guild_id: GuildId) {
        let Some(channel_id) = self.sessions.get(&guild_id).map(|session| session.channel_id)
        else {
            return;
        };

        while let Some(entry) = self.queues.dequeue_front(guild_id) {
            self.last_generation += 1;
            let generation = self.last_generation;

            match self.player.start(guild_id, generation, &entry).await {
                Ok(()) => {
                    info!(
                        "Now playing '{}' in guild {} (track {})",
                        entry.title(),
                        guild_id,
                        generation
                    );
                    self.notifier.now_playing(channel_id, &entry).await;
                    if let Some(session) = self.sessions.get_mut(&guild_id) {
                        session.current = Some(NowPlaying { generation, entry });
                    }
                    return;
                }
                Err(e) => {
                    warn!(
                        "Skipping '{}' in guild {}, failed to start: {}",
                        entry.title(),
                        guild_id,
                        e
                    );
                    self.notifier.track_failed(channel_id, &entry, &e).await;
                }
            }
        }

        info!("Queue finished for guild {}, disconnecting", guild_id);
        self.sessions.remove(&guild_id);
        if let Err(e) = self.player.disconnect(guild_id).await {
            warn!("Failed to disconnect from guild {}: {}", guild_id, e);
        }
        self.notifier.queue_finished(channel_id).await;
        self.queues.evict(guild_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::track_metadata::TrackMetadata;
    use mockall::{Sequence, predicate::eq};
    use serenity::model::id::UserId;

    fn entry(title: &str) -> QueueEntry {
        QueueEntry::new(
            TrackMetadata {
                title: title.to_string(),
                stream_url: format!("https://stream.example/{}", title),
                page_url: None,
                thumbnail: None,
                duration: None,
            },
            UserId::new(1),
        )
    }

    fn guild() -> GuildId {
        GuildId::new(10)
    }

    fn channel() -> ChannelId {
        ChannelId::new(20)
    }

    fn voice() -> ChannelId {
        ChannelId::new(30)
    }

    fn enqueued() -> PlaybackEvent {
        PlaybackEvent::Enqueued {
            guild_id: guild(),
            channel_id: channel(),
            voice_channel_id: voice(),
        }
    }

    /// A player that is connected and starts every track
    fn connected_player() -> MockVoicePlayer {
        let mut player = MockVoicePlayer::new();
        player.expect_is_connected().return_const(true);
        player.expect_join().never();
        player
    }

    #[tokio::test]
    async fn test_empty_queue_disconnects_once() {
        let mut player = connected_player();
        player.expect_start().never();
        player
            .expect_disconnect()
            .with(eq(guild()))
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockPlaybackNotifier::new();
        notifier
            .expect_queue_finished()
            .with(eq(channel()))
            .times(1)
            .return_const(());

        let mut playback = PlaybackLoop::new(
            QueueStore::default(),
            Arc::new(player),
            Arc::new(notifier),
        );
        playback.handle(enqueued()).await;

        assert!(!playback.is_active(guild()));
    }

    #[tokio::test]
    async fn test_failed_start_is_reported_and_skipped() {
        let queues = QueueStore::default();
        queues.enqueue(guild(), entry("broken"));
        queues.enqueue(guild(), entry("works"));

        let mut seq = Sequence::new();
        let mut player = connected_player();
        let mut notifier = MockPlaybackNotifier::new();

        player
            .expect_start()
            .withf(|_, _, entry| entry.title() == "broken")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(MusicError::StreamError("ffmpeg missing".to_string())));
        notifier
            .expect_track_failed()
            .withf(|_, entry, _| entry.title() == "broken")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        player
            .expect_start()
            .withf(|_, _, entry| entry.title() == "works")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        notifier
            .expect_now_playing()
            .withf(|_, entry| entry.title() == "works")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        player.expect_disconnect().never();

        let mut playback = PlaybackLoop::new(queues.clone(), Arc::new(player), Arc::new(notifier));
        playback.handle(enqueued()).await;

        assert!(playback.is_active(guild()));
        assert!(queues.is_empty(guild()));
    }

    #[tokio::test]
    async fn test_stream_failure_is_reported_then_advances() {
        let queues = QueueStore::default();
        queues.enqueue(guild(), entry("expired"));
        queues.enqueue(guild(), entry("next"));

        let mut player = connected_player();
        player.expect_start().times(2).returning(|_, _, _| Ok(()));

        let mut seq = Sequence::new();
        let mut notifier = MockPlaybackNotifier::new();
        notifier
            .expect_now_playing()
            .withf(|_, entry| entry.title() == "expired")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        notifier
            .expect_track_failed()
            .withf(|_, entry, error| {
                entry.title() == "expired"
                    && matches!(error, MusicError::StreamError(reason) if reason == "HTTP 403")
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        notifier
            .expect_now_playing()
            .withf(|_, entry| entry.title() == "next")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut playback = PlaybackLoop::new(queues.clone(), Arc::new(player), Arc::new(notifier));
        playback.handle(enqueued()).await;

        let failed = PlaybackEvent::TrackFailed {
            guild_id: guild(),
            generation: 1,
            reason: "HTTP 403".to_string(),
        };
        playback.handle(failed.clone()).await;
        // The End signal that follows an error for the same track is dropped
        playback
            .handle(PlaybackEvent::TrackFinished {
                guild_id: guild(),
                generation: 1,
            })
            .await;
        playback.handle(failed).await;

        assert!(playback.is_active(guild()));
    }

    #[tokio::test]
    async fn test_enqueue_while_live_does_not_restart() {
        let queues = QueueStore::default();
        queues.enqueue(guild(), entry("first"));

        let mut player = connected_player();
        player.expect_start().times(1).returning(|_, _, _| Ok(()));
        player.expect_is_live().with(eq(guild())).return_const(true);

        let mut notifier = MockPlaybackNotifier::new();
        notifier.expect_now_playing().times(1).return_const(());

        let mut playback = PlaybackLoop::new(queues.clone(), Arc::new(player), Arc::new(notifier));

        playback.handle(enqueued()).await;
        queues.enqueue(guild(), entry("second"));
        playback.handle(enqueued()).await;

        assert_eq!(queues.len(guild()), 1);
    }

    #[tokio::test]
    async fn test_stalled_session_is_restarted() {
        let queues = QueueStore::default();
        queues.enqueue(guild(), entry("first"));

        let mut player = connected_player();
        player.expect_start().times(2).returning(|_, _, _| Ok(()));
        player.expect_is_live().return_const(false);

        let mut notifier = MockPlaybackNotifier::new();
        notifier.expect_now_playing().times(2).return_const(());

        let mut playback = PlaybackLoop::new(queues.clone(), Arc::new(player), Arc::new(notifier));

        playback.handle(enqueued()).await;
        queues.enqueue(guild(), entry("second"));
        playback.handle(enqueued()).await;

        assert!(queues.is_empty(guild()));
    }

    #[tokio::test]
    async fn test_rejoins_requester_channel_when_disconnected() {
        let queues = QueueStore::default();
        queues.enqueue(guild(), entry("late"));

        let mut seq = Sequence::new();
        let mut player = MockVoicePlayer::new();
        player.expect_is_connected().return_const(false);
        player
            .expect_join()
            .with(eq(guild()), eq(voice()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        player
            .expect_start()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let mut notifier = MockPlaybackNotifier::new();
        notifier.expect_now_playing().times(1).return_const(());
        notifier.expect_track_failed().never();

        let mut playback = PlaybackLoop::new(queues, Arc::new(player), Arc::new(notifier));
        playback.handle(enqueued()).await;

        assert!(playback.is_active(guild()));
    }

    #[tokio::test]
    async fn test_handle_posts_to_running_loop() {
        let (handle, receiver) = PlaybackHandle::channel();
        handle.stop(guild());
        drop(handle);

        let mut player = MockVoicePlayer::new();
        player.expect_halt().with(eq(guild())).times(1).return_const(());
        player
            .expect_disconnect()
            .times(1)
            .returning(|_| Err(MusicError::NotConnected));

        let playback = PlaybackLoop::new(
            QueueStore::default(),
            Arc::new(player),
            Arc::new(MockPlaybackNotifier::new()),
        );

        // Returns once the only sender is dropped and the queued event is handled
        playback.run(receiver).await;
    }
}
