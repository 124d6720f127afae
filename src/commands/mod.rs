//! This module aggregates all the command modules for the bot.

/// Commands related to music playback (join, play, queue and transport controls).
pub mod music;
