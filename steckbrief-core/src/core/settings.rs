//! Client settings persistence.
//!
//! Stores the backend address and timing knobs in a JSON file at an
//! OS-appropriate location.

use crate::{Result, SteckbriefError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Origin of the Personen backend, e.g. `http://localhost:8000`.
    pub api_base_url: String,
    /// Upper bound for every request, in seconds.
    pub request_timeout_secs: u64,
    /// Quiet period before a search query is sent.
    pub search_debounce_ms: u64,
    /// Shortest query (in characters) that is sent to the backend.
    pub min_query_chars: usize,
    /// Generations included in the exported family-tree PDF.
    pub stammbaum_generations: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
            search_debounce_ms: 300,
            min_query_chars: 2,
            stammbaum_generations: 3,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Rejects settings that would produce a client that can never work.
    ///
    /// # Errors
    ///
    /// Returns [`SteckbriefError::Config`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(SteckbriefError::Config("apiBaseUrl must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SteckbriefError::Config("requestTimeoutSecs must be at least 1".to_string()));
        }
        if self.stammbaum_generations == 0 {
            return Err(SteckbriefError::Config("stammbaumGenerations must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/steckbrief/settings.json`
/// - Windows: `%APPDATA%/Steckbrief/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("Steckbrief").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("steckbrief").join("settings.json")
    }
}

/// Loads settings from the default location; returns defaults if the file is
/// missing or corrupt.
pub fn load_settings() -> ClientSettings {
    load_settings_from(settings_file_path())
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from<P: AsRef<Path>>(path: P) -> ClientSettings {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings file {}: {e}", path.display());
            ClientSettings::default()
        }),
        Err(_) => ClientSettings::default(),
    }
}

/// Saves settings to the default location, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SteckbriefError::Io`] or [`SteckbriefError::Json`] on failure.
pub fn save_settings(settings: &ClientSettings) -> Result<()> {
    save_settings_to(settings, settings_file_path())
}

/// Saves settings to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SteckbriefError::Io`] or [`SteckbriefError::Json`] on failure.
pub fn save_settings_to<P: AsRef<Path>>(settings: &ClientSettings, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
