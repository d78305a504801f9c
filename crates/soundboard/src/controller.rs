//! The board itself: the list of sounds and the operations the menu drives.
//!
//! The controller is owned by the app thread, so every mutation of the
//! binding list and of the registry is serialized there. The registry handle
//! it holds is shared with the global listener, which only reads it.

use crate::{AppError, AppResult, BindingId, KeyBindingRegistry, KeyId, SoundBinding};

use soundboard_core::{AudioPlayback, is_supported_audio_file};

use std::{
    fs, io,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// What happened to the clip on disk when its sound was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The clip lived in the recordings directory and is gone now.
    FileRemoved,
    /// The clip was left on disk (it lives elsewhere, or removal failed).
    FileKept,
}

/// Owner of all sound bindings.
pub struct SoundboardController {
    bindings: Vec<SoundBinding>,
    next_id: u64,
    registry: KeyBindingRegistry,
    playback: Arc<dyn AudioPlayback>,
    recordings_dir: PathBuf,
}

impl SoundboardController {
    /// Empty board backed by `registry` and `playback`.
    pub fn new(
        registry: KeyBindingRegistry,
        playback: Arc<dyn AudioPlayback>,
        recordings_dir: PathBuf,
    ) -> Self {
        Self {
            bindings: Vec::new(),
            next_id: 1,
            registry,
            playback,
            recordings_dir,
        }
    }

    /// Create a binding, with no key, for every clip already in the
    /// recordings directory. Creates the directory when missing.
    ///
    /// Returns the number of sounds added.
    #[track_caller]
    #[instrument(skip(self), fields(dir = ?self.recordings_dir))]
    pub fn load_existing(&mut self) -> AppResult<usize> {
        fs::create_dir_all(&self.recordings_dir)?;

        let mut clips = Vec::new();
        for entry in fs::read_dir(&self.recordings_dir)? {
            let path = entry?.path();
            if path.is_file() && is_supported_audio_file(&path) {
                clips.push(path);
            }
        }
        clips.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut added = 0;
        for path in clips {
            if self.find_by_path(&path).is_none() {
                self.insert(path);
                added += 1;
            }
        }

        info!(count = added, "Loaded existing recordings");
        Ok(added)
    }

    /// Put a clip on the board. The file is referenced, never copied.
    ///
    /// A path that is already on the board returns the existing sound.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn add_sound(&mut self, path: &Path) -> AppResult<BindingId> {
        if !path.is_file() {
            return Err(AppError::FileNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if !is_supported_audio_file(path) {
            return Err(AppError::UnsupportedFormat {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(existing) = self.find_by_path(path) {
            debug!(binding_id = %existing, "Sound already on the board");
            return Ok(existing);
        }

        let id = self.insert(path.to_path_buf());
        info!(binding_id = %id, path = ?path, "Sound added");
        Ok(id)
    }

    /// Give `id` the key `key`, or clear its key with `None`.
    ///
    /// The new key is bound before the old one is released, so an
    /// `AlreadyBound` rejection leaves the sound's current key in place.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn assign_key(&mut self, id: BindingId, key: Option<KeyId>) -> AppResult<()> {
        let registry = self.registry.clone();
        let binding = self.binding_mut(id)?;

        if let Some(new_key) = &key {
            registry.bind(new_key.clone(), id, &binding.file_path)?;
        }

        if let Some(old_key) = binding.bound_key.take() {
            if key.as_ref() != Some(&old_key) {
                registry.unbind(&old_key);
            }
        }
        binding.bound_key = key;

        match &binding.bound_key {
            Some(k) => info!(binding_id = %id, key = %k, "Key assigned"),
            None => info!(binding_id = %id, "Key cleared"),
        }

        Ok(())
    }

    /// Remove a sound and its key.
    ///
    /// The clip is deleted from disk only when it lives inside the recordings
    /// directory.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: BindingId) -> AppResult<DeleteOutcome> {
        let index = self
            .bindings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::UnknownBinding {
                id,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let binding = self.bindings.remove(index);
        if let Some(key) = &binding.bound_key {
            self.registry.unbind(key);
        }

        if !self.is_managed(&binding.file_path) {
            info!(binding_id = %id, path = ?binding.file_path, "Sound removed, file kept");
            return Ok(DeleteOutcome::FileKept);
        }

        match fs::remove_file(&binding.file_path) {
            Ok(()) => {
                info!(binding_id = %id, path = ?binding.file_path, "Sound and recording removed");
                Ok(DeleteOutcome::FileRemoved)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?binding.file_path, "Recording already gone");
                Ok(DeleteOutcome::FileRemoved)
            }
            Err(e) => {
                warn!(path = ?binding.file_path, error = %e, "Failed to remove recording");
                Ok(DeleteOutcome::FileKept)
            }
        }
    }

    /// Play the clip of `id` through the same port the hotkeys use.
    #[track_caller]
    pub fn play(&self, id: BindingId) -> AppResult<()> {
        let binding = self.binding(id).ok_or_else(|| AppError::UnknownBinding {
            id,
            location: ErrorLocation::from(Location::caller()),
        })?;
        self.playback.play(&binding.file_path)?;
        Ok(())
    }

    /// All sounds, in the order they were added.
    pub fn bindings(&self) -> &[SoundBinding] {
        &self.bindings
    }

    /// Sound `id`, if still on the board.
    pub fn binding(&self, id: BindingId) -> Option<&SoundBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    /// Shared key registry.
    pub fn registry(&self) -> &KeyBindingRegistry {
        &self.registry
    }

    /// Directory recordings are written to and deleted from.
    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// True when `path` resolves to a location inside the recordings
    /// directory. Symlinks and `..` components are resolved first.
    pub fn is_managed(&self, path: &Path) -> bool {
        let Ok(dir) = fs::canonicalize(&self.recordings_dir) else {
            return false;
        };
        resolve(path).is_some_and(|p| p.starts_with(&dir))
    }

    fn insert(&mut self, path: PathBuf) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        self.bindings.push(SoundBinding::new(id, path));
        id
    }

    fn find_by_path(&self, path: &Path) -> Option<BindingId> {
        let wanted = resolve(path);
        self.bindings
            .iter()
            .find(|b| b.file_path == path || (wanted.is_some() && resolve(&b.file_path) == wanted))
            .map(|b| b.id)
    }

    #[track_caller]
    fn binding_mut(&mut self, id: BindingId) -> AppResult<&mut SoundBinding> {
        self.bindings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::UnknownBinding {
                id,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

// A missing file is resolved through its parent so a recording that vanished
// from disk still counts as managed.
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = fs::canonicalize(path) {
        return Some(p);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path.file_name()?;
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}
