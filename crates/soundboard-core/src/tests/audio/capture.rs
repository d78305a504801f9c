use crate::audio::capture::{append_within_limit, buffer_limit, downmix_to_mono, to_pcm16};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// WHAT: The buffer limit follows the device layout and the requested duration
/// WHY: A 96 kHz stereo device must fit a whole recording, however long
#[test]
fn given_device_layout_when_sizing_buffer_then_rate_times_channels_times_duration() {
    // Given: Two device layouts and a ten minute recording
    let ten_minutes = Duration::from_secs(600);

    // When: Sizing the buffers
    let hi_res = buffer_limit(96_000, 2, ten_minutes);
    let quad = buffer_limit(48_000, 4, ten_minutes);

    // Then: Every interleaved sample of the duration fits
    assert_eq!(hi_res, 96_000 * 2 * 600);
    assert_eq!(quad, 48_000 * 4 * 600);
}

/// WHAT: An absurd duration saturates instead of overflowing
/// WHY: Any positive duration is accepted by the workflow
#[test]
fn given_huge_duration_when_sizing_buffer_then_no_overflow() {
    // Given/When: A high-rate 8 channel device and a near-maximal duration
    let limit = buffer_limit(192_000, 8, Duration::from_secs(u64::MAX / 2));

    // Then: A usable limit, no panic
    assert!(limit > 0);
}

/// WHAT: A full buffer keeps its oldest samples and drops the overflow
/// WHY: The start of the clip matters; the tail is trimmed to length anyway
#[test]
fn given_buffer_near_limit_when_appending_then_start_kept_and_overflow_dropped() {
    // Given: A buffer two samples short of its limit
    let mut buf = vec![0.0f32; 8];

    // When: Appending four samples of 1.0
    append_within_limit(&mut buf, &[1.0; 4], 10);

    // Then: Only two were taken, the original samples are untouched
    assert_eq!(buf.len(), 10);
    assert!(buf[..8].iter().all(|&s| s == 0.0));
    assert!(buf[8..].iter().all(|&s| (s - 1.0).abs() < f32::EPSILON));
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: A panicking holder must not silently lose captured audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(VecDeque::from(vec![0.5f32; 100])));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from poisoned lock using unwrap_or_else
    let recovered = buf.lock().unwrap_or_else(|e| e.into_inner());

    // Then: Original data is fully preserved
    assert_eq!(recovered.len(), 100);
    assert!(recovered.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Stereo frames are averaged into one channel
/// WHY: Recordings are always mono regardless of the device layout
#[test]
fn given_stereo_frames_when_downmixing_then_each_frame_averaged() {
    // Given: Three interleaved stereo frames
    let interleaved = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];

    // When: Downmixing to mono
    let mono = downmix_to_mono(&interleaved, 2);

    // Then: One sample per frame, holding the frame average
    assert_eq!(mono, vec![0.5, 0.5, 0.0]);
}

/// WHAT: Mono input passes through the downmix untouched
/// WHY: Avoids needless work and rounding on mono microphones
#[test]
fn given_mono_samples_when_downmixing_then_unchanged() {
    // Given: Three mono samples
    let samples = [0.1f32, -0.2, 0.3];

    // When: Downmixing one channel
    let mono = downmix_to_mono(&samples, 1);

    // Then: Identical
    assert_eq!(mono, samples.to_vec());
}

/// WHAT: Float samples map onto the full i16 range and overs are clamped
/// WHY: The WAV format is 16-bit linear PCM; clipping must not wrap around
#[test]
fn given_float_samples_when_converting_to_pcm16_then_scaled_and_clamped() {
    // Given: Full-scale, silent and out-of-range samples
    let samples = [1.0f32, -1.0, 0.0, 2.5, -3.0];

    // When: Converting to PCM
    let pcm = to_pcm16(&samples);

    // Then: Extremes land on +/- i16::MAX and overs are clamped
    assert_eq!(pcm, vec![i16::MAX, -i16::MAX, 0, i16::MAX, -i16::MAX]);
}
