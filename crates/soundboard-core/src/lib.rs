//! Soundboard Core Library
//!
//! Audio capture, playback and WAV persistence for the soundboard, built on
//! CPAL, Rubato, Rodio and Hound.
//!
//! # Example
//!
//! ```no_run
//! use soundboard_core::{AudioCapture, CoreResult, CpalCapture, write_recording};
//!
//! use std::{path::Path, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let capture = CpalCapture::new(None);
//!
//!     let handle = capture.begin(Duration::from_secs(2))?;
//!     let samples = handle.finish(Duration::from_secs(4))?;
//!
//!     write_recording(Path::new("recordings/clap.wav"), &samples)?;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;

pub use {
    audio::{
        AudioCapture, AudioPlayback, BITS_PER_SAMPLE, CHANNELS, CaptureHandle, CpalCapture,
        RECORDING_EXTENSION, RodioPlayback, SAMPLE_RATE, SUPPORTED_EXTENSIONS, UnavailablePlayback,
        expected_samples, is_supported_audio_file, write_recording,
    },
    error::AudioError,
    error::Result as CoreResult,
};

#[cfg(test)]
mod tests;
