use crate::{
    AppError, BindingId, KeyBindingRegistry, KeyId, SoundboardController,
    controller::DeleteOutcome,
    tests::fakes::{FakePlayback, write_clip},
};

use soundboard_core::{AudioError, UnavailablePlayback};

use std::{fs, path::Path, sync::Arc};

fn controller(recordings: &Path) -> (SoundboardController, Arc<FakePlayback>) {
    let playback = Arc::new(FakePlayback::default());
    let controller = SoundboardController::new(
        KeyBindingRegistry::new(),
        playback.clone(),
        recordings.to_path_buf(),
    );
    (controller, playback)
}

/// WHAT: Loading an empty or missing directory succeeds with no sounds
/// WHY: First launch has no recordings yet
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_dir_when_loading_then_created_and_empty() {
    // Given: A recordings path that does not exist yet
    let root = tempfile::tempdir().unwrap();
    let recordings = root.path().join("recordings");
    let (mut controller, _) = controller(&recordings);

    // When: Loading
    let count = controller.load_existing().unwrap();

    // Then: Created, nothing listed
    assert_eq!(count, 0);
    assert!(recordings.is_dir());
    assert!(controller.bindings().is_empty());
}

/// WHAT: Existing clips load as unbound sounds, sorted, non-audio skipped
/// WHY: Startup never prompts for keys
#[test]
#[allow(clippy::unwrap_used)]
fn given_existing_clips_when_loading_then_unbound_sounds_in_name_order() {
    // Given: Two clips, a text file and a sub-directory
    let dir = tempfile::tempdir().unwrap();
    write_clip(&dir.path().join("b.wav"));
    fs::write(dir.path().join("a.MP3"), b"mp3").unwrap();
    fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
    fs::create_dir(dir.path().join("sub.wav")).unwrap();
    let (mut controller, _) = controller(dir.path());

    // When: Loading
    let count = controller.load_existing().unwrap();

    // Then: a.MP3 then b.wav, neither with a key
    assert_eq!(count, 2);
    let names: Vec<_> = controller
        .bindings()
        .iter()
        .map(|b| b.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["a.MP3", "b.wav"]);
    assert!(controller.bindings().iter().all(|b| b.bound_key.is_none()));
    assert!(controller.registry().is_empty());
}

/// WHAT: Missing and unsupported files are refused
/// WHY: No binding is created for a file that cannot play
#[test]
#[allow(clippy::unwrap_used)]
fn given_bad_files_when_adding_then_rejected_without_binding() {
    // Given: A text file and a path that does not exist
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("readme.txt");
    fs::write(&text, b"hi").unwrap();
    let (mut controller, _) = controller(dir.path());

    // When: Adding both
    let missing = controller.add_sound(&dir.path().join("nope.wav"));
    let unsupported = controller.add_sound(&text);

    // Then: Each refused with its own error, nothing bound
    assert!(matches!(missing, Err(AppError::FileNotFound { .. })));
    assert!(matches!(unsupported, Err(AppError::UnsupportedFormat { .. })));
    assert!(controller.bindings().is_empty());
}

/// WHAT: Adding the same file twice returns the first sound
/// WHY: One file, one button
#[test]
#[allow(clippy::unwrap_used)]
fn given_added_file_when_added_again_then_same_id() {
    // Given: boom.ogg on disk
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("boom.ogg");
    fs::write(&clip, b"ogg").unwrap();
    let (mut controller, _) = controller(dir.path());

    // When: Adding it twice
    let first = controller.add_sound(&clip).unwrap();
    let second = controller.add_sound(&clip).unwrap();

    // Then: One sound, one id
    assert_eq!(first, second);
    assert_eq!(controller.bindings().len(), 1);
    assert_eq!(controller.binding(first).unwrap().display_name, "boom.ogg");
}

/// WHAT: Re-assigning 'a' to 'b' frees 'a'
/// WHY: A sound has at most one key and the registry mirrors it
#[test]
#[allow(clippy::unwrap_used)]
fn given_sound_on_a_when_reassigned_to_b_then_only_b_bound() {
    // Given: A sound bound to 'a'
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clap.wav");
    write_clip(&clip);
    let (mut controller, _) = controller(dir.path());
    let id = controller.add_sound(&clip).unwrap();
    controller.assign_key(id, Some(KeyId::Char('a'))).unwrap();

    // When: Re-assigning to 'b'
    controller.assign_key(id, Some(KeyId::Char('b'))).unwrap();

    // Then: 'a' is free, 'b' plays it, the label shows 'b'
    let registry = controller.registry();
    assert_eq!(registry.lookup(&KeyId::Char('a')), None);
    assert_eq!(registry.lookup(&KeyId::Char('b')), Some(id));
    assert_eq!(controller.binding(id).unwrap().label(), "clap.wav (b)");
}

/// WHAT: Assigning a key held by another sound fails and changes nothing
/// WHY: The holder keeps its key; the requester keeps its old key
#[test]
#[allow(clippy::unwrap_used)]
fn given_key_held_by_other_when_assigned_then_both_sounds_unchanged() {
    // Given: one.wav on 'x', two.wav on 'y'
    let dir = tempfile::tempdir().unwrap();
    let one = dir.path().join("one.wav");
    let two = dir.path().join("two.wav");
    write_clip(&one);
    write_clip(&two);
    let (mut controller, _) = controller(dir.path());
    let a = controller.add_sound(&one).unwrap();
    let b = controller.add_sound(&two).unwrap();
    controller.assign_key(a, Some(KeyId::Char('x'))).unwrap();
    controller.assign_key(b, Some(KeyId::Char('y'))).unwrap();

    // When: Asking for 'x' for two.wav
    let result = controller.assign_key(b, Some(KeyId::Char('x')));

    // Then: Refused, both keys where they were
    assert!(matches!(result, Err(AppError::AlreadyBound { .. })));
    assert_eq!(controller.registry().lookup(&KeyId::Char('x')), Some(a));
    assert_eq!(controller.registry().lookup(&KeyId::Char('y')), Some(b));
    assert_eq!(
        controller.binding(b).unwrap().bound_key,
        Some(KeyId::Char('y'))
    );
}

/// WHAT: Assigning no key clears the binding
/// WHY: "No key" is a valid prompt outcome
#[test]
#[allow(clippy::unwrap_used)]
fn given_bound_sound_when_key_cleared_then_unbound_everywhere() {
    // Given: clap.wav bound to 'c'
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clap.wav");
    write_clip(&clip);
    let (mut controller, _) = controller(dir.path());
    let id = controller.add_sound(&clip).unwrap();
    controller.assign_key(id, Some(KeyId::Char('c'))).unwrap();

    // When: Assigning no key
    controller.assign_key(id, None).unwrap();

    // Then: Registry empty, sound unbound
    assert!(controller.registry().is_empty());
    assert_eq!(controller.binding(id).unwrap().bound_key, None);
}

/// WHAT: Deleting a recording removes the sound, its key and the file
/// WHY: A deleted key must do nothing afterwards
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_in_managed_dir_when_deleted_then_file_and_key_gone() {
    // Given: take.wav in the recordings directory, bound to 't'
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("take.wav");
    write_clip(&clip);
    let (mut controller, _) = controller(dir.path());
    let id = controller.add_sound(&clip).unwrap();
    controller.assign_key(id, Some(KeyId::Char('t'))).unwrap();

    // When: Deleting it
    let outcome = controller.delete(id).unwrap();

    // Then: File, key and sound gone
    assert_eq!(outcome, DeleteOutcome::FileRemoved);
    assert!(!clip.exists());
    assert_eq!(controller.registry().lookup(&KeyId::Char('t')), None);
    assert!(controller.binding(id).is_none());
}

/// WHAT: Deleting a sound picked from elsewhere leaves its file alone
/// WHY: Only the recordings directory is managed
#[test]
#[allow(clippy::unwrap_used)]
fn given_file_outside_managed_dir_when_deleted_then_file_kept() {
    // Given: recordings/ and a clip next to it, bound to 'o'
    let root = tempfile::tempdir().unwrap();
    let recordings = root.path().join("recordings");
    fs::create_dir(&recordings).unwrap();
    let outside = root.path().join("outside.wav");
    write_clip(&outside);
    let (mut controller, _) = controller(&recordings);
    let id = controller.add_sound(&outside).unwrap();
    controller.assign_key(id, Some(KeyId::Char('o'))).unwrap();

    // When: Deleting it
    let outcome = controller.delete(id).unwrap();

    // Then: Binding and key gone, file untouched
    assert_eq!(outcome, DeleteOutcome::FileKept);
    assert!(outside.exists());
    assert!(controller.bindings().is_empty());
    assert!(controller.registry().is_empty());
}

/// WHAT: A `..` path that leaves the recordings directory is not managed
/// WHY: Paths are compared after resolution
#[test]
#[allow(clippy::unwrap_used)]
fn given_dotdot_path_when_checking_managed_then_outside() {
    // Given: sneaky.wav beside recordings/
    let root = tempfile::tempdir().unwrap();
    let recordings = root.path().join("recordings");
    fs::create_dir(&recordings).unwrap();
    let outside = root.path().join("sneaky.wav");
    write_clip(&outside);
    let (controller, _) = controller(&recordings);

    // When/Then: Reached through `..` it is outside, a plain child is inside
    assert!(!controller.is_managed(&recordings.join("..").join("sneaky.wav")));
    assert!(controller.is_managed(&recordings.join("gone.wav")));
}

/// WHAT: Unknown ids are reported
/// WHY: A stale menu entry must not crash the app
#[test]
fn given_unknown_id_when_operating_then_unknown_binding() {
    // Given: An empty board
    let (mut controller, _) = controller(Path::new("recordings-unused"));

    // When/Then: Delete, assign and play all report UnknownBinding
    assert!(matches!(
        controller.delete(BindingId(42)),
        Err(AppError::UnknownBinding { .. })
    ));
    assert!(matches!(
        controller.assign_key(BindingId(42), None),
        Err(AppError::UnknownBinding { .. })
    ));
    assert!(matches!(
        controller.play(BindingId(42)),
        Err(AppError::UnknownBinding { .. })
    ));
}

/// WHAT: Playing from the menu uses the playback port
/// WHY: Clicking and hotkeys sound the same
#[test]
#[allow(clippy::unwrap_used)]
fn given_sound_when_played_then_port_receives_path() {
    // Given: ding.wav on the board
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("ding.wav");
    write_clip(&clip);
    let (mut controller, playback) = controller(dir.path());
    let id = controller.add_sound(&clip).unwrap();

    // When: Playing it
    controller.play(id).unwrap();

    // Then: The port got its path
    assert_eq!(playback.played(), vec![clip]);
}

/// WHAT: Without an output device, playing fails but keys can still be managed
/// WHY: A missing speaker is an I/O error, never a reason to stop the board
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_output_device_when_playing_then_error_and_board_still_usable() {
    // Given: A board whose playback has no device
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("horn.wav");
    write_clip(&clip);
    let mut controller = SoundboardController::new(
        KeyBindingRegistry::new(),
        Arc::new(UnavailablePlayback::new("no speakers")),
        dir.path().to_path_buf(),
    );
    let id = controller.add_sound(&clip).unwrap();

    // When: Playing it, then binding a key
    let played = controller.play(id);
    let bound = controller.assign_key(id, Some(KeyId::Char('h')));

    // Then: The play error names the missing output, the key is bound
    let error = played.unwrap_err();
    assert!(matches!(
        error,
        AppError::Audio {
            source: AudioError::NoOutputDevice { .. },
            ..
        }
    ));
    assert_eq!(error.user_message(), "No audio output: no speakers");
    assert!(bound.is_ok());
    assert_eq!(controller.registry().lookup(&KeyId::Char('h')), Some(id));
}
