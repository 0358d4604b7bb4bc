//! TOML-based user preferences.
//!
//! Presentation-facing knobs only -- engine thresholds (penalty sizes,
//! streak limits, bonus intervals) are fixed constants, not
//! preferences. Stored at `~/.config/studymate/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{CoreError, StorageError, ValidationError};

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    /// Speak distraction alerts out loud.
    #[serde(default = "default_true")]
    pub voice_alerts: bool,
    /// Seconds between supervision frame captures.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_secs: u32,
    /// Daily study goal shown on the stats panel.
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
    /// Companion persona used for alert phrasing.
    #[serde(default = "default_style")]
    pub companion_style: String,
}

fn default_true() -> bool {
    true
}

fn default_frame_interval() -> u32 {
    15
}

fn default_daily_goal() -> u32 {
    120
}

fn default_style() -> String {
    "gentle".to_string()
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidValue {
        field: key.to_string(),
        message: format!("cannot parse {value:?}"),
    })
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            voice_alerts: default_true(),
            frame_interval_secs: default_frame_interval(),
            daily_goal_minutes: default_daily_goal(),
            companion_style: default_style(),
        }
    }
}

impl Prefs {
    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load preferences, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let prefs: Prefs = toml::from_str(&raw).map_err(|e| StorageError::PrefsLoadFailed {
            path,
            message: e.to_string(),
        })?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Save preferences to the config file.
    pub fn save(&self) -> Result<(), CoreError> {
        self.validate()?;
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| StorageError::PrefsSaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    /// Look up a preference by key for CLI display.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "voice_alerts" => Some(self.voice_alerts.to_string()),
            "frame_interval_secs" => Some(self.frame_interval_secs.to_string()),
            "daily_goal_minutes" => Some(self.daily_goal_minutes.to_string()),
            "companion_style" => Some(self.companion_style.clone()),
            _ => None,
        }
    }

    /// Set a preference from its string form, validate, and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        match key {
            "voice_alerts" => self.voice_alerts = parse_field(key, value)?,
            "frame_interval_secs" => self.frame_interval_secs = parse_field(key, value)?,
            "daily_goal_minutes" => self.daily_goal_minutes = parse_field(key, value)?,
            "companion_style" => self.companion_style = value.to_string(),
            _ => {
                return Err(ValidationError::InvalidValue {
                    field: key.to_string(),
                    message: "unknown preference key".to_string(),
                }
                .into())
            }
        }
        self.save()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.frame_interval_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "frame_interval_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.daily_goal_minutes == 0 || self.daily_goal_minutes > 1440 {
            return Err(ValidationError::InvalidValue {
                field: "daily_goal_minutes".to_string(),
                message: "must be between 1 and 1440".to_string(),
            });
        }
        Ok(())
    }
}
