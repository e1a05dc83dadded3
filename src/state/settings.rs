/// Application settings
///
/// Settings are read from `settings.json` in the user's config directory.
/// Every field is optional in the file; anything missing falls back to
/// its default, and a file that can't be read is ignored with a warning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name used under the platform data and config directories
const APP_DIR: &str = "game-collection";

/// Default database file name
const DB_FILE: &str = "games.db";

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Location of the catalogue database, overrides the data directory default
    pub database_path: Option<PathBuf>,
    /// Initial window width in logical pixels
    pub window_width: f32,
    /// Initial window height in logical pixels
    pub window_height: f32,
    /// Use the dark theme instead of the light one
    pub dark_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            window_width: 600.0,
            window_height: 550.0,
            dark_theme: false,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("Could not determine config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from `path`. A missing file silently yields defaults,
    /// an unreadable one logs a warning first.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Path of the catalogue database
    ///
    /// - Linux: ~/.local/share/game-collection/games.db
    /// - macOS: ~/Library/Application Support/game-collection/games.db
    /// - Windows: %APPDATA%\game-collection\games.db
    ///
    /// Falls back to `games.db` in the working directory when no data
    /// directory can be determined.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        match dirs::data_dir().or_else(dirs::home_dir) {
            Some(mut path) => {
                path.push(APP_DIR);
                path.push(DB_FILE);
                path
            }
            None => PathBuf::from(DB_FILE),
        }
    }

    /// Where the settings file lives, e.g. ~/.config/game-collection/settings.json
    fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push(APP_DIR);
        path.push(SETTINGS_FILE);
        Some(path)
    }
}
