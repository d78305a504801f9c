use crate::audio::{SAMPLE_RATE, expected_samples, is_supported_audio_file};

use std::{path::Path, time::Duration};

/// WHAT: wav, mp3 and ogg are accepted in any letter case
/// WHY: The file picker and startup scan share this filter
#[test]
fn given_supported_extensions_when_checking_then_accepted() {
    // Given/When/Then: Each supported name, in mixed case, passes
    for name in ["clap.wav", "horn.MP3", "rain.Ogg", "/tmp/dir.with.dots/x.wav"] {
        assert!(is_supported_audio_file(Path::new(name)), "{name} rejected");
    }
}

/// WHAT: Other or missing extensions are rejected
/// WHY: Prevents bindings to files the player cannot decode
#[test]
fn given_unsupported_extensions_when_checking_then_rejected() {
    // Given/When/Then: Each other or missing extension fails
    for name in ["notes.txt", "clip.flac", "wav", "recordings/clap"] {
        assert!(!is_supported_audio_file(Path::new(name)), "{name} accepted");
    }
}

/// WHAT: Sample count follows the fixed 44.1 kHz rate
/// WHY: Recorded clips must last the requested number of seconds
#[test]
fn given_two_seconds_when_computing_expected_samples_then_twice_the_rate() {
    // Given/When/Then: Two seconds at 44.1 kHz
    assert_eq!(
        expected_samples(Duration::from_secs(2)),
        2 * SAMPLE_RATE as usize
    );
}
