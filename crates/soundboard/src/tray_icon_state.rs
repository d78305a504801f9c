use crate::BoardStatus;

/// Tray icon colours, one per kind of board status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready.
    Idle,
    /// Counting down before a recording.
    Countdown,
    /// Microphone open or recording being saved.
    Recording,
    /// Key or text prompt open.
    Prompting,
}

impl TrayIconState {
    /// RGB fill of the generated icon.
    pub fn colour(&self) -> [u8; 3] {
        match self {
            TrayIconState::Idle => [0x4c, 0xaf, 0x50],
            TrayIconState::Countdown => [0xff, 0xb3, 0x00],
            TrayIconState::Recording => [0xe5, 0x39, 0x35],
            TrayIconState::Prompting => [0x1e, 0x88, 0xe5],
        }
    }
}

impl From<&BoardStatus> for TrayIconState {
    fn from(status: &BoardStatus) -> Self {
        match status {
            BoardStatus::Idle => TrayIconState::Idle,
            BoardStatus::Countdown(_) => TrayIconState::Countdown,
            BoardStatus::Recording(_) | BoardStatus::Saving => TrayIconState::Recording,
            BoardStatus::AwaitingKey(_) | BoardStatus::AwaitingText(_) => {
                TrayIconState::Prompting
            }
        }
    }
}
