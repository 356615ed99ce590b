// SPDX-License-Identifier: GPL-3.0-only

//! User configuration.
//!
//! The config file is JSON and every field is optional:
//!
//! ```json
//! {
//!   "layout": "us",
//!   "layout_dir": "/home/me/.config/softkey/layouts",
//!   "modifier_behavior": "latch",
//!   "num_lock_mask": "MOD2"
//! }
//! ```
//!
//! Masks given here override the ones in the layout description.

use crate::app_settings::{APP_ID, APP_VERSION, CONFIG_FILE_NAME, DEFAULT_LAYOUT};
use crate::input::{KeyboardSink, ModifierBehavior, ModifierMask};
use crate::keyboard::Keyboard;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration that persists between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u64,

    /// Layout name to instantiate
    pub layout: String,

    /// Directory searched for layouts before the built-in set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_dir: Option<PathBuf>,

    /// Modifier behavior the keyboard starts with. Latch unless configured,
    /// so a single tap of a modifier or the level toggle sticks.
    pub modifier_behavior: ModifierBehavior,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_lock_mask: Option<ModifierMask>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_gr_mask: Option<ModifierMask>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: APP_VERSION,
            layout: DEFAULT_LAYOUT.to_string(),
            layout_dir: None,
            modifier_behavior: ModifierBehavior::Latch,
            num_lock_mask: None,
            alt_gr_mask: None,
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    /// The platform has no config directory
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { source, path } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::Json { source, path } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::NoConfigDir => write!(f, "Failed to determine config directory"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
            ConfigError::NoConfigDir => None,
        }
    }
}

impl Config {
    /// Platform config directory for this application.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_ID))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Default location of the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            source,
            path: path.to_path_buf(),
        })?;

        if config.version != APP_VERSION {
            tracing::warn!(
                "Config version {} differs from {}, loading anyway",
                config.version,
                APP_VERSION
            );
        }
        Ok(config)
    }

    /// Loads the config at `path`, falling back to defaults when it does not
    /// exist. A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Applies the starting behavior and any mask overrides to a freshly
    /// built keyboard.
    pub fn apply<S: KeyboardSink>(&self, keyboard: &mut Keyboard<S>) {
        keyboard.set_modifier_behavior(self.modifier_behavior);
        if let Some(mask) = self.num_lock_mask {
            keyboard.set_num_lock_mask(mask);
        }
        if let Some(mask) = self.alt_gr_mask {
            keyboard.set_alt_gr_mask(mask);
        }
    }
}
