// SPDX-License-Identifier: GPL-3.0-only

//! Persisted user preferences

use crate::backends::camera::CaptureFormat;
use crate::constants::APP_NAME;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder captures are written to and the gallery reads from
    pub image_folder: PathBuf,
    /// Encoding of new captures
    pub capture_format: CaptureFormat,
    /// Rule-of-thirds style grid over the preview
    pub grid_overlay: bool,
    /// Show the live preview on the display
    pub preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_folder: default_image_folder(),
            capture_format: CaptureFormat::default(),
            grid_overlay: false,
            preview: true,
        }
    }
}

/// `~/Pictures/fotopi`, or `./images` on systems without a home directory
pub fn default_image_folder() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("images"))
}

/// Location of the preference file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

/// Directory for logs and other application data
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load preferences from the default location
    ///
    /// A missing or unreadable file yields defaults; preferences are never a
    /// reason not to start.
    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!(error = %e, "Using default preferences");
                Self::default()
            }
        }
    }

    /// Load preferences from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "Preferences loaded");
                config
            }
            Ok(None) => {
                info!(path = %path.display(), "No preferences yet, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                Self::default()
            }
        }
    }

    /// Read preferences from `path`; `Ok(None)` if the file does not exist
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Save preferences to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path()?)
    }

    /// Save preferences to `path`
    ///
    /// Writes a sibling temp file and renames it over the old one so a power
    /// cut never leaves a truncated file behind.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "Preferences saved");
        Ok(())
    }
}
