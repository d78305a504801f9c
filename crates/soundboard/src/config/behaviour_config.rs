use crate::config::default_assign_key_on_add;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Ask for a key right after a sound is added or recorded.
    #[serde(default = "default_assign_key_on_add")]
    pub assign_key_on_add: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            assign_key_on_add: default_assign_key_on_add(),
        }
    }
}
