use crate::{AudioError, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE, write_recording};

use std::fs;

/// WHAT: Written recordings use the fixed mono 16-bit 44.1kHz format
/// WHY: Every clip the record flow produces must share one WAV layout
#[test]
#[allow(clippy::unwrap_used)]
fn given_samples_when_writing_recording_then_wav_has_fixed_format() {
    // Given: Two seconds of PCM and a destination inside a temp dir
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clap.wav");
    let samples = vec![1000i16; 2 * SAMPLE_RATE as usize];

    // When: Writing the recording
    write_recording(&path, &samples).unwrap();

    // Then: The header matches the recording format and the length is 2s
    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, CHANNELS);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, BITS_PER_SAMPLE);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.duration(), 2 * SAMPLE_RATE);
}

/// WHAT: Only the final file remains after a successful write
/// WHY: The temp file used for the atomic write must not leak into the folder
#[test]
#[allow(clippy::unwrap_used)]
fn given_successful_write_when_listing_directory_then_only_final_file() {
    // Given: An empty directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("horn.wav");

    // When: Writing horn.wav
    write_recording(&path, &[0, 1, 2, 3]).unwrap();

    // Then: horn.wav is the only entry
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["horn.wav".to_string()]);
}

/// WHAT: A write into a missing directory fails without leaving files
/// WHY: Save errors must not leave partial recordings behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_directory_when_writing_then_error_and_no_file() {
    // Given: A destination whose parent does not exist
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("clap.wav");

    // When: Writing the recording
    let result = write_recording(&path, &[0i16; 16]);

    // Then: WavWriteFailed, and nothing exists at the destination
    assert!(matches!(result, Err(AudioError::WavWriteFailed { .. })));
    assert!(!path.exists());
    assert!(!dir.path().join("missing").exists());
}
