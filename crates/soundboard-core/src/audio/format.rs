use std::{path::Path, time::Duration};

/// Channel count of every recorded clip.
pub const CHANNELS: u16 = 1;

/// Sample rate of every recorded clip.
pub const SAMPLE_RATE: u32 = 44_100;

/// Bit depth of every recorded clip (signed linear PCM).
pub const BITS_PER_SAMPLE: u16 = 16;

/// Extension given to recorded clips.
pub const RECORDING_EXTENSION: &str = "wav";

/// Extensions accepted when adding or loading sounds.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

/// True when `path` carries one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Number of mono samples a recording of `duration` holds at [`SAMPLE_RATE`].
pub fn expected_samples(duration: Duration) -> usize {
    (duration.as_secs_f64() * f64::from(SAMPLE_RATE)).round() as usize
}
