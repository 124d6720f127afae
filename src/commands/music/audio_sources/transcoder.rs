//! Spawns ffmpeg on a resolved stream URL and hands its stdout to songbird.

use songbird::input::{ChildContainer, Input};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::config::Config;

pub struct Transcoder {
    before_options: Vec<String>,
    options: Vec<String>,
}

impl Transcoder {
    pub fn new(before_options: &str, options: &str) -> Self {
        Self {
            before_options: split_options(before_options),
            options: split_options(options),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ffmpeg_before_options, &config.ffmpeg_options)
    }

    /// Full ffmpeg argument list for `stream_url`, writing mp3 to stdout.
    pub fn args(&self, stream_url: &str) -> Vec<String> {
        let mut args = self.before_options.clone();
        args.extend(["-i".to_string(), stream_url.to_string()]);
        args.extend(self.options.iter().cloned());
        args.extend(
            ["-loglevel", "error", "-f", "mp3", "pipe:1"]
                .into_iter()
                .map(String::from),
        );
        args
    }

    /// Start ffmpeg and wrap its output as a songbird input.
    pub fn spawn(&self, stream_url: &str) -> MusicResult<Input> {
        debug!("Spawning ffmpeg for {}", stream_url);
        let child = Command::new("ffmpeg")
            .args(self.args(stream_url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MusicError::StreamError(format!("Failed to start ffmpeg: {}", e)))?;

        Ok(ChildContainer::from(child).into())
    }
}

fn split_options(options: &str) -> Vec<String> {
    options.split_whitespace().map(String::from).collect()
}
