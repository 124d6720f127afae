//! Recording fakes for the voice and notification sides of playback

use async_trait::async_trait;
use cadence::commands::music::audio_sources::track_metadata::QueueEntry;
use cadence::commands::music::utils::{
    music_manager::{MusicError, MusicResult},
    playback::{PlaybackNotifier, VoicePlayer},
    songbird_player::{check_pause, check_resume, check_skip},
};
use poise::serenity_prelude::{ChannelId, GuildId};
use songbird::tracks::PlayMode;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Everything the playback loop or a control asked the outside world to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Join(ChannelId),
    Start { title: String, generation: u64 },
    Pause,
    Resume,
    Skip,
    Halt,
    Disconnect,
    NowPlaying(String),
    TrackFailed(String),
    QueueFinished,
}

pub type ActionLog = Arc<Mutex<Vec<Action>>>;

pub fn action_log() -> ActionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn actions(log: &ActionLog) -> Vec<Action> {
    log.lock().unwrap().clone()
}

/// Generations of every track that was started
pub fn generations(log: &ActionLog) -> Vec<u64> {
    actions(log)
        .into_iter()
        .filter_map(|action| match action {
            Action::Start { generation, .. } => Some(generation),
            _ => None,
        })
        .collect()
}

pub fn count(log: &ActionLog, wanted: &Action) -> usize {
    actions(log).iter().filter(|action| *action == wanted).count()
}

/// Connection and track state of the fake voice driver
struct VoiceState {
    connected: bool,
    mode: Option<PlayMode>,
}

/// Voice player that records calls. Tracks stay live until skipped, halted
/// or disconnected, and starting a track needs a connection.
pub struct RecordingPlayer {
    log: ActionLog,
    failing: HashSet<String>,
    state: Mutex<VoiceState>,
}

impl RecordingPlayer {
    pub fn new(log: ActionLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
            state: Mutex::new(VoiceState {
                connected: true,
                mode: None,
            }),
        }
    }

    /// Begin without a voice connection
    pub fn disconnected(self) -> Self {
        self.state.lock().unwrap().connected = false;
        self
    }

    /// Starting a track with this title returns a stream error
    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }

    fn record(&self, action: Action) {
        self.log.lock().unwrap().push(action);
    }
}

#[async_trait]
impl VoicePlayer for RecordingPlayer {
    fn is_connected(&self, _guild_id: GuildId) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn join(&self, _guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.state.lock().unwrap().connected = true;
        self.record(Action::Join(channel_id));
        Ok(())
    }

    async fn start(
        &self,
        _guild_id: GuildId,
        generation: u64,
        entry: &QueueEntry,
    ) -> MusicResult<()> {
        self.record(Action::Start {
            title: entry.title().to_string(),
            generation,
        });
        if self.failing.contains(entry.title()) {
            return Err(MusicError::StreamError("stream refused".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(MusicError::NotConnected);
        }
        state.mode = Some(PlayMode::Play);
        Ok(())
    }

    async fn pause(&self, _guild_id: GuildId) -> MusicResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            check_pause(state.mode.as_ref())?;
            state.mode = Some(PlayMode::Pause);
        }
        self.record(Action::Pause);
        Ok(())
    }

    async fn resume(&self, _guild_id: GuildId) -> MusicResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            check_resume(state.mode.as_ref())?;
            state.mode = Some(PlayMode::Play);
        }
        self.record(Action::Resume);
        Ok(())
    }

    async fn skip(&self, _guild_id: GuildId) -> MusicResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            check_skip(state.mode.as_ref())?;
            state.mode = None;
        }
        self.record(Action::Skip);
        Ok(())
    }

    async fn is_live(&self, _guild_id: GuildId) -> bool {
        matches!(
            self.state.lock().unwrap().mode,
            Some(PlayMode::Play) | Some(PlayMode::Pause)
        )
    }

    async fn halt(&self, _guild_id: GuildId) {
        self.state.lock().unwrap().mode = None;
        self.record(Action::Halt);
    }

    async fn disconnect(&self, _guild_id: GuildId) -> MusicResult<()> {
        let was_connected = {
            let mut state = self.state.lock().unwrap();
            state.mode = None;
            std::mem::replace(&mut state.connected, false)
        };
        self.record(Action::Disconnect);

        if was_connected {
            Ok(())
        } else {
            Err(MusicError::NotConnected)
        }
    }
}

pub struct RecordingNotifier {
    log: ActionLog,
}

impl RecordingNotifier {
    pub fn new(log: ActionLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl PlaybackNotifier for RecordingNotifier {
    async fn now_playing(&self, _channel_id: ChannelId, entry: &QueueEntry) {
        self.log
            .lock()
            .unwrap()
            .push(Action::NowPlaying(entry.title().to_string()));
    }

    async fn track_failed(&self, _channel_id: ChannelId, entry: &QueueEntry, _error: &MusicError) {
        self.log
            .lock()
            .unwrap()
            .push(Action::TrackFailed(entry.title().to_string()));
    }

    async fn queue_finished(&self, _channel_id: ChannelId) {
        self.log.lock().unwrap().push(Action::QueueFinished);
    }
}
