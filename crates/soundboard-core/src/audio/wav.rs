use crate::{
    AudioError, CoreResult,
    audio::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, instrument, warn};

/// The one format every recording is written in.
pub(crate) fn recording_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Write `samples` to `path` as a mono 16-bit 44.1 kHz WAV.
///
/// The data goes to a sibling temp file that is renamed over `path` only
/// after the writer finalizes, so a failed write never leaves a truncated
/// clip behind. The temp file is removed on failure (best effort).
#[track_caller]
#[instrument(skip(samples), fields(sample_count = samples.len()))]
pub fn write_recording(path: &Path, samples: &[i16]) -> CoreResult<()> {
    let location = ErrorLocation::from(Location::caller());
    let temp_path = temp_path_for(path);

    let result = write_temp(&temp_path, samples)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| e.to_string()));

    match result {
        Ok(()) => {
            info!(path = ?path, "Recording written");
            Ok(())
        }
        Err(reason) => {
            if temp_path.exists() {
                if let Err(e) = fs::remove_file(&temp_path) {
                    warn!(path = ?temp_path, error = %e, "Failed to remove partial recording");
                }
            }
            Err(AudioError::WavWriteFailed {
                path: path.to_path_buf(),
                reason,
                location,
            })
        }
    }
}

fn write_temp(temp_path: &Path, samples: &[i16]) -> Result<(), String> {
    let mut writer = WavWriter::create(temp_path, recording_spec()).map_err(|e| e.to_string())?;
    for &sample in samples {
        writer.write_sample(sample).map_err(|e| e.to_string())?;
    }
    writer.finalize().map_err(|e| e.to_string())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
