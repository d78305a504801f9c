use std::path::PathBuf;

/// Recording workflow state.
///
/// `Countdown` and `Capturing` carry the seconds still shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    /// No recording in progress.
    Idle,
    /// Counting down before the microphone opens.
    Countdown {
        /// Seconds left before capture starts.
        remaining: u32,
    },
    /// Microphone open.
    Capturing {
        /// Seconds of capture left.
        remaining: u64,
    },
    /// Writing the captured buffer to disk. Cannot be cancelled.
    Saving,
    /// Recording written.
    Done {
        /// The new clip.
        path: PathBuf,
    },
    /// Recording abandoned; nothing was written.
    Cancelled,
}
