use serde::{Deserialize, Serialize};

/// Microphone selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device name (None = system default; an unknown name falls back
    /// to the default as well).
    #[serde(default)]
    pub selected_device: Option<String>,
}
