use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

/// Prefix shared by every player button id; the event handler routes on it.
pub const CONTROL_PREFIX: &str = "music_";

/// The four transport actions offered both as commands and as buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pause,
    Resume,
    Skip,
    Stop,
}

impl Control {
    pub const ALL: [Control; 4] = [Control::Pause, Control::Resume, Control::Skip, Control::Stop];

    pub fn custom_id(self) -> &'static str {
        match self {
            Control::Pause => "music_pause",
            Control::Resume => "music_resume",
            Control::Skip => "music_skip",
            Control::Stop => "music_stop",
        }
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.custom_id() == custom_id)
    }

    /// Reply sent once the action has been applied
    pub fn confirmation(self) -> &'static str {
        match self {
            Control::Pause => "⏸️ Playback paused.",
            Control::Resume => "▶️ Playback resumed.",
            Control::Skip => "⏭️ Song skipped!",
            Control::Stop => "⏹️ Playback stopped, queue cleared, and disconnected.",
        }
    }

    fn button(self) -> CreateButton {
        let (emoji, label, style) = match self {
            Control::Pause => ("⏸️", "Pause", ButtonStyle::Secondary),
            Control::Resume => ("▶️", "Resume", ButtonStyle::Secondary),
            Control::Skip => ("⏭️", "Skip", ButtonStyle::Primary),
            Control::Stop => ("⏹️", "Stop", ButtonStyle::Danger),
        };

        CreateButton::new(self.custom_id())
            .emoji(ReactionType::Unicode(emoji.to_string()))
            .style(style)
            .label(label)
    }
}

/// Creates the row of player buttons attached to "now playing" messages
pub fn create_music_control_buttons() -> Vec<CreateActionRow> {
    let buttons = Control::ALL.into_iter().map(Control::button).collect();
    vec![CreateActionRow::Buttons(buttons)]
}
