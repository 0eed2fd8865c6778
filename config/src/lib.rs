//! Configuration loading and write-back.
//!
//! ```toml
//! teleport_outside_players = true
//!
//! [border]
//! center_x = 0.0
//! center_z = 0.0
//! initial_size = 1000.0
//! final_size = 100.0
//! shrink_amount_per_step = 50.0
//! shrink_interval_ticks = 1200
//! grace_period_ticks = 6000
//!
//! [messages]
//! enabled = true
//!
//! [sounds]
//! shrink_sound = "entity.ender_dragon.growl"
//! ```
//!
//! Loading never fails hard: a bad field is reported as a [`ConfigWarning`]
//! and replaced by its default, and an unreadable file yields defaults.

mod persist;
mod resolve;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shrinkborder_types::BorderSettings;
use shrinkborder_utils::recover_bak_file;

pub use resolve::{ConfigWarning, resolve_settings};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SHRINKBORDER_CONFIG";

const SCHEDULE_FILE_NAME: &str = "schedule.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write config at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Settings resolved from the config file, plus any per-field fallbacks taken.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: BorderSettings,
    pub warnings: Vec<ConfigWarning>,
}

/// Location of the config file and the data files stored beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$SHRINKBORDER_CONFIG`, else `~/.shrinkborder/config.toml`.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Some(Self::new(path));
        }
        config_path().map(Self::new)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the config file; schedule records and logs live here too.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir().join(SCHEDULE_FILE_NAME)
    }

    /// Load settings. A missing file yields defaults with no warnings.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        recover_bak_file(&self.path);
        if !self.path.exists() {
            return Ok(LoadedConfig {
                settings: BorderSettings::default(),
                warnings: Vec::new(),
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;

        let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        Ok(resolve_settings(&table))
    }

    /// [`load`](Self::load), logging every problem and falling back to defaults.
    #[must_use]
    pub fn load_or_default(&self) -> BorderSettings {
        match self.load() {
            Ok(loaded) => {
                for warning in &loaded.warnings {
                    tracing::warn!(path = %self.path.display(), "{warning}");
                }
                loaded.settings
            }
            Err(err) => {
                tracing::warn!("{err}; using default settings");
                BorderSettings::default()
            }
        }
    }

    /// Write every setting back to the file, preserving comments and unknown keys.
    pub fn persist(&self, settings: &BorderSettings) -> Result<(), ConfigError> {
        persist::write_settings(&self.path, settings).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".shrinkborder").join("config.toml"))
}
