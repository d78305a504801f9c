mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod recordings_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config,
    logging_config::LoggingConfig, recordings_config::RecordingsConfig,
};

use std::path::PathBuf;

pub(crate) const DEFAULT_ASSIGN_KEY_ON_ADD: bool = true;
pub(crate) const DEFAULT_RECORDINGS_DIR: &str = "recordings";
pub(crate) const DEFAULT_LOG_FILTER: &str = "soundboard=debug,soundboard_core=debug";

pub(crate) fn default_assign_key_on_add() -> bool {
    DEFAULT_ASSIGN_KEY_ON_ADD
}

pub(crate) fn default_recordings_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RECORDINGS_DIR)
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
