//! Countdown -> capture -> save, one tick per second.
//!
//! The workflow never sleeps. The app loop calls [`RecordingWorkflow::tick`]
//! once per second on its own thread, so every state change (and every label
//! update derived from it) happens there. Only the blocking capture runs on
//! a worker thread, behind the [`AudioCapture`] port.

use crate::{AppError, AppResult, RecordingState};

use soundboard_core::{AudioCapture, CaptureHandle, RECORDING_EXTENSION, write_recording};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Seconds shown before the microphone opens.
pub const COUNTDOWN_SECS: u32 = 3;

/// Extra time allowed for the capture worker to hand over its buffer.
const CAPTURE_GRACE: Duration = Duration::from_secs(2);

/// One-shot cancellation flag shared with whoever may cancel the recording.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation. Cannot be retracted.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct RecordingSession {
    session_id: Uuid,
    file_path: PathBuf,
    duration_secs: u64,
    cancel: CancelHandle,
    capture: Option<CaptureHandle>,
}

/// Timed recording state machine.
pub struct RecordingWorkflow {
    capture: Box<dyn AudioCapture>,
    recordings_dir: PathBuf,
    state: RecordingState,
    session: Option<RecordingSession>,
}

impl RecordingWorkflow {
    /// Workflow saving into `recordings_dir` and capturing through `capture`.
    pub fn new(capture: Box<dyn AudioCapture>, recordings_dir: PathBuf) -> Self {
        Self {
            capture,
            recordings_dir,
            state: RecordingState::Idle,
            session: None,
        }
    }

    /// Current state (the last outcome once a session has ended).
    #[cfg(test)]
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// True while a session is counting down or capturing.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Where a recording called `name` is written.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.recordings_dir
            .join(format!("{}.{}", name, RECORDING_EXTENSION))
    }

    /// Validate the inputs and enter the countdown.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self, name: &str, duration_secs: i64) -> AppResult<RecordingState> {
        if self.session.is_some() {
            return Err(AppError::RecordingInProgress {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = validate_name(name)?;
        let duration_secs = u64::try_from(duration_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| AppError::InvalidDuration {
                input: duration_secs.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let session_id = Uuid::new_v4();
        let file_path = self.path_for(&name);

        self.session = Some(RecordingSession {
            session_id,
            file_path,
            duration_secs,
            cancel: CancelHandle::default(),
            capture: None,
        });
        self.state = RecordingState::Countdown {
            remaining: COUNTDOWN_SECS,
        };

        info!(
            session_id = %session_id,
            name = %name,
            duration_secs,
            "Recording countdown started"
        );

        Ok(self.state.clone())
    }

    /// Advance one second.
    ///
    /// Cancellation is observed here, at the tick boundary, and once more
    /// right before saving. Errors end the session and return to `Idle`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> AppResult<RecordingState> {
        let Some(session) = self.session.as_mut() else {
            return Ok(self.state.clone());
        };

        if session.cancel.is_cancelled() {
            return Ok(self.finish_cancelled());
        }

        // A device that died mid-capture ends the session now, not at save.
        if let Some(e) = session.capture.as_mut().and_then(CaptureHandle::poll_failure) {
            error!(session_id = %session.session_id, error = %e, "Capture failed");
            self.reset();
            return Err(AppError::CaptureDeviceError {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let next = match self.state {
            RecordingState::Countdown { remaining } if remaining > 1 => {
                RecordingState::Countdown {
                    remaining: remaining - 1,
                }
            }
            RecordingState::Countdown { .. } => {
                let duration = Duration::from_secs(session.duration_secs);
                match self.capture.begin(duration) {
                    Ok(handle) => {
                        session.capture = Some(handle);
                        info!(session_id = %session.session_id, "Capture started");
                        RecordingState::Capturing {
                            remaining: session.duration_secs,
                        }
                    }
                    Err(e) => {
                        error!(session_id = %session.session_id, error = %e, "Capture failed to start");
                        self.reset();
                        return Err(AppError::CaptureDeviceError {
                            reason: e.to_string(),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                }
            }
            RecordingState::Capturing { remaining } if remaining > 1 => {
                RecordingState::Capturing {
                    remaining: remaining - 1,
                }
            }
            RecordingState::Capturing { .. } => return self.save(),
            _ => {
                warn!(state = ?self.state, "Tick in unexpected state, resetting");
                self.reset();
                RecordingState::Idle
            }
        };

        debug!(state = ?next, "Recording tick");
        self.state = next;
        Ok(self.state.clone())
    }

    /// Request cancellation of the running session, if any.
    pub fn cancel(&self) {
        if let Some(session) = &self.session {
            session.cancel.cancel();
            info!(session_id = %session.session_id, "Recording cancel requested");
        }
    }

    #[track_caller]
    fn save(&mut self) -> AppResult<RecordingState> {
        let Some(mut session) = self.session.take() else {
            return Ok(self.state.clone());
        };

        // Last chance to cancel; past this point the save always runs.
        if session.cancel.is_cancelled() {
            self.session = Some(session);
            return Ok(self.finish_cancelled());
        }

        self.state = RecordingState::Saving;

        let samples = match session.capture.take() {
            Some(handle) => handle.finish(CAPTURE_GRACE).map_err(|e| {
                error!(session_id = %session.session_id, error = %e, "Capture failed");
                AppError::CaptureDeviceError {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            }),
            None => Err(AppError::CaptureDeviceError {
                reason: "No capture running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        };

        let result = samples.and_then(|samples| write_clip(&session.file_path, &samples));

        match result {
            Ok(()) => {
                info!(
                    session_id = %session.session_id,
                    path = ?session.file_path,
                    "Recording saved"
                );
                self.state = RecordingState::Done {
                    path: session.file_path,
                };
                Ok(self.state.clone())
            }
            Err(e) => {
                self.state = RecordingState::Idle;
                Err(e)
            }
        }
    }

    fn finish_cancelled(&mut self) -> RecordingState {
        if let Some(mut session) = self.session.take() {
            if let Some(handle) = session.capture.take() {
                handle.stop();
            }
            info!(session_id = %session.session_id, "Recording cancelled");
        }
        self.state = RecordingState::Cancelled;
        self.state.clone()
    }

    fn reset(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Some(handle) = session.capture.take() {
                handle.stop();
            }
        }
        self.state = RecordingState::Idle;
    }
}

#[track_caller]
fn write_clip(path: &Path, samples: &[i16]) -> AppResult<()> {
    let caller = Location::caller();

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| AppError::SaveError {
            path: path.to_path_buf(),
            reason: e.to_string(),
            location: ErrorLocation::from(caller),
        })?;
    }

    write_recording(path, samples).map_err(|e| AppError::SaveError {
        path: path.to_path_buf(),
        reason: e.to_string(),
        location: ErrorLocation::from(caller),
    })
}

/// Characters no recording name may contain on any desktop platform.
const RESERVED_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Trim and check a recording name.
///
/// A trailing `.wav` is dropped (it is added back when saving). Empty names,
/// `.`/`..`, control characters and characters reserved in file names are
/// rejected so the clip always lands directly inside the recordings
/// directory.
#[track_caller]
pub fn validate_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    let stem = strip_recording_extension(trimmed).trim_end();

    let reserved = stem
        .chars()
        .any(|c| c.is_control() || RESERVED_NAME_CHARS.contains(&c));

    if stem.is_empty() || stem == "." || stem == ".." || reserved {
        return Err(AppError::InvalidName {
            name: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(stem.to_string())
}

fn strip_recording_extension(name: &str) -> &str {
    let suffix_len = RECORDING_EXTENSION.len() + 1;
    let Some(split) = name.len().checked_sub(suffix_len) else {
        return name;
    };
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(suffix))
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(RECORDING_EXTENSION) =>
        {
            stem
        }
        _ => name,
    }
}

/// Parse the duration typed into the prompt. Range is checked by `start`.
#[track_caller]
pub fn parse_duration(input: &str) -> AppResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidDuration {
            input: input.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}
