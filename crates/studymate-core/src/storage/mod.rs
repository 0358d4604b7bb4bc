pub mod database;
mod prefs;
mod store;

pub use database::Database;
pub use prefs::Prefs;
pub use store::{MemoryStore, ProgressStore};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/studymate[-dev]/` based on STUDYMATE_ENV.
///
/// Set STUDYMATE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYMATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studymate-dev")
    } else {
        base_dir.join("studymate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
