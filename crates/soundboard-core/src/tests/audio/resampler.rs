use crate::audio::{Resampler, SAMPLE_RATE};

// Test constants
const INPUT_SAMPLE_RATE: u32 = 48000;
const ONE_SECOND_INPUT_SAMPLES: usize = INPUT_SAMPLE_RATE as usize;
const ONE_SECOND_OUTPUT_SAMPLES: usize = SAMPLE_RATE as usize;
const LENGTH_TOLERANCE: u64 = 100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const TONE_INPUT_SAMPLES: usize = 4800;
const TONE_FREQUENCY_FACTOR: f32 = 0.05;
const TONE_OUTPUT_SAMPLES: usize = 4410;
const MAX_AMPLITUDE: f32 = 1.5;

/// WHAT: Resampler converts 48kHz to 44.1kHz with the right length
/// WHY: Recordings are stored at 44.1kHz whatever the device rate is
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_audio_when_resampling_to_recording_rate_then_length_preserved() {
    // Given: Resampler configured for 48kHz -> 44.1kHz
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, SAMPLE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_INPUT_SAMPLES];

    // When: Resampling one second of audio
    let output = resampler.resample(&input).unwrap();

    // Then: Output is approximately one second at 44.1kHz
    assert!(
        (output.len() as i64 - ONE_SECOND_OUTPUT_SAMPLES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Empty samples return empty output
/// WHY: Edge case handling for zero-length input
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_samples_when_resampling_then_empty_output() {
    // Given: A resampler from the device rate
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, SAMPLE_RATE).unwrap();

    // When: Resampling nothing
    let output = resampler.resample(&[]).unwrap();

    // Then: Nothing
    assert!(output.is_empty());
}

/// WHAT: A short tone keeps its length and stays bounded
/// WHY: The final partial chunk and filter delay must not stretch or clip clips
#[test]
#[allow(clippy::unwrap_used)]
fn given_tone_signal_when_resampling_then_output_preserves_characteristics() {
    // Given: Resampler and a 100ms sine tone
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, SAMPLE_RATE).unwrap();
    let input: Vec<f32> = (0..TONE_INPUT_SAMPLES)
        .map(|i| (i as f32 * TONE_FREQUENCY_FACTOR).sin())
        .collect();

    // When: Resampling the signal
    let output = resampler.resample(&input).unwrap();

    // Then: Output has the expected length and all samples are finite
    assert!(
        (output.len() as i64 - TONE_OUTPUT_SAMPLES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        TONE_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(
        output
            .iter()
            .all(|&s| s.is_finite() && s.abs() <= MAX_AMPLITUDE)
    );
}
