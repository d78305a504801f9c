//! Port to the on-screen surface.
//!
//! The app never talks to the tray, a dialog or the console directly. It asks
//! for a file or a line of text and pushes notices and status through
//! [`UserInterface`], which keeps the flows testable with an in-memory fake.

use crate::BindingId;

use std::path::PathBuf;

use async_trait::async_trait;

/// Message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Something finished.
    Info(String),
    /// Input was rejected or an action was refused.
    Warning(String),
    /// An operation failed.
    Error(String),
}

impl Notice {
    /// Notice text.
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(t) | Notice::Warning(t) | Notice::Error(t) => t,
        }
    }
}

/// What the board is doing, shown on the icon and tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStatus {
    /// Ready.
    Idle,
    /// Seconds before the microphone opens.
    Countdown(u32),
    /// Seconds of recording left.
    Recording(u64),
    /// Writing the recording.
    Saving,
    /// Waiting for a key for the named sound.
    AwaitingKey(String),
    /// Waiting for the named line of text.
    AwaitingText(String),
}

impl BoardStatus {
    /// Tooltip text.
    pub fn describe(&self) -> String {
        match self {
            BoardStatus::Idle => "Soundboard - Ready".to_string(),
            BoardStatus::Countdown(n) => format!("Soundboard - Recording in {}...", n),
            BoardStatus::Recording(n) => format!("Soundboard - Recording... {}s left", n),
            BoardStatus::Saving => "Soundboard - Saving recording".to_string(),
            BoardStatus::AwaitingKey(name) => {
                format!("Soundboard - Press a key for {} (Cancel for none)", name)
            }
            BoardStatus::AwaitingText(label) => format!("Soundboard - Enter {}", label),
        }
    }
}

/// One row of the sound menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    /// Sound the row acts on.
    pub id: BindingId,
    /// Row text, `name (key)`.
    pub label: String,
}

/// Prompts and displays used by the app flows.
#[async_trait]
pub trait UserInterface: Send + Sync {
    /// Ask for an audio file. `None` when the picker is cancelled.
    async fn pick_audio_file(&self) -> Option<PathBuf>;

    /// Ask for one line of text. `None` when cancelled or when no text
    /// input is available.
    ///
    /// The app drops this future when the user picks Cancel or Exit from the
    /// menu, so implementations must not hold state across that drop.
    async fn ask_text(&self, title: &str, label: &str) -> Option<String>;

    /// Show a notice.
    fn notify(&self, notice: Notice);

    /// Show the current board status.
    fn set_status(&self, status: BoardStatus);

    /// Replace the list of sounds offered in the menus.
    fn set_sounds(&self, sounds: Vec<SoundEntry>);
}
