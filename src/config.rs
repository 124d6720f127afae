//! Startup configuration read from the environment (and `.env` via `dotenv`).

use std::env;
use thiserror::Error;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_YTDL_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";
pub const DEFAULT_FFMPEG_BEFORE_OPTIONS: &str =
    "-reconnect 1 -reconnect_streamed 1 -reconnect_delay_max 5";
pub const DEFAULT_FFMPEG_OPTIONS: &str = "-vn";

/// Errors raised while loading configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Environment variable {0} must not be empty")]
    Empty(&'static str),
}

#[derive(Clone)]
pub struct Config {
    /// Bot authentication token
    pub discord_token: String,
    /// Prefix for chat commands, e.g. `!play`
    pub command_prefix: String,
    /// yt-dlp format selector used when resolving stream URLs
    pub ytdl_format: String,
    /// ffmpeg arguments placed before `-i`
    pub ffmpeg_before_options: String,
    /// ffmpeg arguments placed after the input
    pub ffmpeg_options: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        if discord_token.trim().is_empty() {
            return Err(ConfigError::Empty("DISCORD_TOKEN"));
        }

        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            discord_token,
            command_prefix: or_default("COMMAND_PREFIX", DEFAULT_PREFIX),
            ytdl_format: or_default("YTDL_FORMAT", DEFAULT_YTDL_FORMAT),
            ffmpeg_before_options: or_default(
                "FFMPEG_BEFORE_OPTIONS",
                DEFAULT_FFMPEG_BEFORE_OPTIONS,
            ),
            ffmpeg_options: or_default("FFMPEG_OPTIONS", DEFAULT_FFMPEG_OPTIONS),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .field("ytdl_format", &self.ytdl_format)
            .field("ffmpeg_before_options", &self.ffmpeg_before_options)
            .field("ffmpeg_options", &self.ffmpeg_options)
            .finish()
    }
}
