pub(crate) mod capture;
mod format;
mod playback;
mod ports;
mod resampler;
pub(crate) mod wav;

pub(crate) use resampler::Resampler;

pub use {
    capture::CpalCapture,
    format::{
        BITS_PER_SAMPLE, CHANNELS, RECORDING_EXTENSION, SAMPLE_RATE, SUPPORTED_EXTENSIONS,
        expected_samples, is_supported_audio_file,
    },
    playback::{RodioPlayback, UnavailablePlayback},
    ports::{AudioCapture, AudioPlayback, CaptureHandle},
    wav::write_recording,
};
