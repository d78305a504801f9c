use crate::KeyId;

use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Identifier of a sound on the board. Allocated by the controller, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A sound file on the board and the key that plays it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundBinding {
    /// Stable id.
    pub id: BindingId,
    /// Clip location, as picked or recorded (never copied).
    pub file_path: PathBuf,
    /// File name shown to the user.
    pub display_name: String,
    /// Key that triggers the clip. Must mirror the registry.
    pub bound_key: Option<KeyId>,
}

impl SoundBinding {
    pub(crate) fn new(id: BindingId, file_path: PathBuf) -> Self {
        let display_name = display_name_for(&file_path);
        Self {
            id,
            file_path,
            display_name,
            bound_key: None,
        }
    }

    /// Menu label: `clap.wav (a)` when bound, `clap.wav` otherwise.
    pub fn label(&self) -> String {
        match &self.bound_key {
            Some(key) => format!("{} ({})", self.display_name, key),
            None => self.display_name.clone(),
        }
    }
}

fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
