use crate::{BindingId, KeyId};

use soundboard_core::AudioError;

use std::{panic::Location, path::PathBuf, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the soundboard binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Audio subsystem error from soundboard-core.
    #[error("Audio error: {source} {location}")]
    Audio {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Recording name is empty or would escape the recordings directory.
    #[error("Invalid recording name {name:?} {location}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Recording duration is not a positive whole number of seconds.
    #[error("Invalid recording duration {input:?} {location}")]
    InvalidDuration {
        /// The rejected input as typed.
        input: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Key is already bound to a different sound.
    #[error("Key '{key}' is already bound to sound {bound_to} {location}")]
    AlreadyBound {
        /// The contested key.
        key: KeyId,
        /// The binding currently holding the key.
        bound_to: BindingId,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Microphone missing or failed while recording.
    #[error("Capture device error: {reason} {location}")]
    CaptureDeviceError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Captured audio could not be written to disk.
    #[error("Failed to save recording {path:?}: {reason} {location}")]
    SaveError {
        /// Intended destination of the recording.
        path: PathBuf,
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Audio file to add does not exist.
    #[error("File not found: {path:?} {location}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Audio file has an extension the player does not handle.
    #[error("Unsupported audio format: {path:?} {location}")]
    UnsupportedFormat {
        /// The rejected path.
        path: PathBuf,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// No sound with this id exists.
    #[error("Unknown sound {id} {location}")]
    UnknownBinding {
        /// The id that was not found.
        id: BindingId,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A recording is already running.
    #[error("A recording is already in progress {location}")]
    RecordingInProgress {
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to start the global key listener.
    #[error("Hotkey listener failed: {reason} {location}")]
    HotkeyListenerFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Tray icon or menu operation failed.
    #[error("Tray error: {reason} {location}")]
    TrayError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Short text for desktop notices, without source locations.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidName { name, .. } if name.trim().is_empty() => {
                "Please enter a name for the sound.".to_string()
            }
            AppError::InvalidName { name, .. } => {
                format!("'{}' cannot be used as a sound name.", name)
            }
            AppError::InvalidDuration { input, .. } => {
                format!("'{}' is not a valid number of seconds.", input)
            }
            AppError::AlreadyBound { key, .. } => {
                format!("'{}' is already used, press another key.", key)
            }
            AppError::CaptureDeviceError { reason, .. } => {
                format!("Recording failed: {}", reason)
            }
            AppError::SaveError { path, .. } => {
                format!("Could not save {}.", path.display())
            }
            AppError::FileNotFound { path, .. } => {
                format!("{} does not exist.", path.display())
            }
            AppError::UnsupportedFormat { path, .. } => {
                format!("{} is not a wav, mp3 or ogg file.", path.display())
            }
            AppError::UnknownBinding { .. } => "That sound no longer exists.".to_string(),
            AppError::RecordingInProgress { .. } => "A recording is already running.".to_string(),
            AppError::Audio {
                source: AudioError::NoOutputDevice { reason, .. },
                ..
            } => format!("No audio output: {}", reason),
            AppError::Audio { source, .. } => format!("Audio problem: {}", source),
            AppError::HotkeyListenerFailed { reason, .. }
            | AppError::TrayError { reason, .. }
            | AppError::ConfigError { reason, .. } => reason.clone(),
            AppError::IoError { source, .. } => source.to_string(),
        }
    }
}

// Manual From<AudioError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AudioError> for AppError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        AppError::Audio {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
