use crate::{AudioError, AudioPlayback, RodioPlayback, UnavailablePlayback};

use std::path::Path;

/// WHAT: Playing a missing file reports FileOpenFailed
/// WHY: The hotkey listener logs this instead of queueing a dead clip
#[test]
#[ignore = "Requires an audio output device"]
#[allow(clippy::unwrap_used)]
fn given_missing_file_when_playing_then_file_open_failed() {
    // Given: Playback on the default output device
    let playback = RodioPlayback::new().unwrap();

    // When: Playing a path that does not exist
    let result = playback.play(Path::new("/nonexistent/clip.wav"));

    // Then: The error names the missing file
    assert!(matches!(result, Err(AudioError::FileOpenFailed { .. })));
}

/// WHAT: The stand-in playback fails every clip with NoOutputDevice
/// WHY: A machine without speakers keeps the board running and says why
#[test]
fn given_no_output_device_when_playing_then_no_output_device_error() {
    // Given: Playback standing in for a missing device
    let playback = UnavailablePlayback::new("no default output device");

    // When: Playing any clip
    let result = playback.play(Path::new("clap.wav"));

    // Then: The reason is carried in the error
    assert!(matches!(
        result,
        Err(AudioError::NoOutputDevice { ref reason, .. }) if reason == "no default output device"
    ));
}
