mod config;
mod state;

pub use config::{Config, RemoteConfig, StatsConfig, TimerConfig, TOKEN_ENV};
pub use state::{load_timer_state, save_timer_state};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Overrides the data directory entirely (used by tests and scripted runs).
pub const DATA_DIR_ENV: &str = "DEVDASH_DATA_DIR";

/// Returns `~/.config/devdash[-dev]/` based on DEVDASH_ENV.
///
/// Set DEVDASH_ENV=dev to use the development data directory, or
/// DEVDASH_DATA_DIR to point somewhere else.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DEVDASH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("devdash-dev")
            } else {
                base_dir.join("devdash")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Unsent session records.
pub fn pending_queue_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("pending_sessions.json"))
}

/// Last saved timer state.
pub fn timer_state_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("timer_state.json"))
}
