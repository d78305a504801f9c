use crate::config::default_recordings_dir;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where recorded clips live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingsConfig {
    /// Recordings directory. Relative paths resolve against the working
    /// directory.
    #[serde(default = "default_recordings_dir")]
    pub directory: PathBuf,
}

impl Default for RecordingsConfig {
    fn default() -> Self {
        Self {
            directory: default_recordings_dir(),
        }
    }
}
