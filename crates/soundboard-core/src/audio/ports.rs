//! Capture and playback seams.
//!
//! The application talks to audio hardware only through these two traits so
//! the recording workflow and hotkey dispatch can run against in-memory fakes.

use crate::{AudioError, CoreResult};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Microphone capture capability.
pub trait AudioCapture: Send {
    /// Begin capturing mono audio for `duration` on a worker thread.
    ///
    /// Returns once the device is recording, or with an error when no usable
    /// input device exists.
    fn begin(&self, duration: Duration) -> CoreResult<CaptureHandle>;
}

/// Audio output capability.
pub trait AudioPlayback: Send + Sync {
    /// Start playing the clip at `path` without waiting for it to finish.
    fn play(&self, path: &Path) -> CoreResult<()>;
}

/// Handle to a capture running on a worker thread.
///
/// The worker delivers its buffer (44.1 kHz mono i16) through a channel.
/// Dropping the handle without calling [`finish`](Self::finish) stops the
/// capture and discards whatever was recorded.
pub struct CaptureHandle {
    stop_flag: Arc<AtomicBool>,
    result_rx: mpsc::Receiver<CoreResult<Vec<i16>>>,
    early: Option<CoreResult<Vec<i16>>>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Run `job` on a new worker thread.
    ///
    /// The job receives the stop flag and must return early (with
    /// [`AudioError::CaptureStopped`]) once the flag is set.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>) -> CoreResult<Vec<i16>> + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (result_tx, result_rx) = mpsc::channel();

        let worker_stop = Arc::clone(&stop_flag);
        let worker = std::thread::spawn(move || {
            let result = job(worker_stop);
            // Receiver gone means the caller already discarded the capture.
            let _ = result_tx.send(result);
        });

        Self {
            stop_flag,
            result_rx,
            early: None,
            worker: Some(worker),
        }
    }

    /// Check, without blocking, whether the worker already gave up.
    ///
    /// Returns the worker's error once it has failed. A buffer delivered
    /// early is kept for [`finish`](Self::finish).
    #[track_caller]
    pub fn poll_failure(&mut self) -> Option<AudioError> {
        if self.early.is_none() {
            match self.result_rx.try_recv() {
                Ok(result) => self.early = Some(result),
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.early = Some(Err(AudioError::DeviceError {
                        reason: "Capture worker exited without a result".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    }));
                }
            }
        }

        match self.early.take() {
            Some(Err(e)) => Some(e),
            kept => {
                self.early = kept;
                None
            }
        }
    }

    /// Stop the capture immediately and discard the partial buffer.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Capture worker panicked while stopping");
            }
        }
        debug!("Capture stopped, partial buffer discarded");
    }

    /// Wait up to `timeout` for the captured buffer.
    #[track_caller]
    pub fn finish(mut self, timeout: Duration) -> CoreResult<Vec<i16>> {
        if let Some(result) = self.early.take() {
            if let Some(worker) = self.worker.take() {
                if worker.join().is_err() {
                    warn!("Capture worker panicked");
                }
            }
            return result;
        }

        let (result, timed_out) = match self.result_rx.recv_timeout(timeout) {
            Ok(result) => (result, false),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.stop_flag.store(true, Ordering::Release);
                let err = AudioError::DeviceError {
                    reason: format!("Capture did not complete within {:?}", timeout),
                    location: ErrorLocation::from(Location::caller()),
                };
                (Err(err), true)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let err = AudioError::DeviceError {
                    reason: "Capture worker exited without a result".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                };
                (Err(err), false)
            }
        };

        // A timed-out worker sees the stop flag and exits on its own.
        if let Some(worker) = self.worker.take() {
            if !timed_out && worker.join().is_err() {
                warn!("Capture worker panicked");
            }
        }

        result
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}
