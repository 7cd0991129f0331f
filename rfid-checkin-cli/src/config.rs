//! Configuration management for the check-in station.
//!
//! Configuration is layered with figment: built-in defaults, then an optional
//! TOML file, then `RFID_CHECKIN_` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use rfid_checkin_pcsc::Feedback;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rfid-checkin";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "checkin.db";

/// Prefix of environment variables. Nested keys are separated by `__`,
/// e.g. `RFID_CHECKIN_READER__POLL_INTERVAL_MS`.
const ENV_PREFIX: &str = "RFID_CHECKIN_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RFID_CHECKIN_`)
/// 2. TOML config file at `~/.config/rfid-checkin/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Reader configuration.
    pub reader: ReaderConfig,
}

/// Database-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rfid-checkin/checkin.db`
    pub path: Option<PathBuf>,
}

/// Reader-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Use the first PC/SC reader whose name starts with this prefix.
    /// Any reader is accepted when unset.
    pub name_prefix: Option<String>,
    /// Delay between polls while no new tag is present, in milliseconds.
    pub poll_interval_ms: u64,
    /// Delay after each processed tap, in milliseconds.
    pub tap_cooldown_ms: u64,
    /// Sound the ACR122U buzzer when a card enters the field.
    pub beep_on_detect: bool,
    /// Flash the ACR122U LED after a tap has been recorded.
    pub blink_on_tap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            name_prefix: None,
            poll_interval_ms: 100,
            tap_cooldown_ms: 1000,
            beep_on_detect: true,
            blink_on_tap: true,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.reader.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if let Some(prefix) = &self.reader.name_prefix {
            if prefix.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "name_prefix must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.reader.poll_interval_ms)
    }

    /// Get the post-tap cooldown as a Duration.
    #[must_use]
    pub fn tap_cooldown(&self) -> Duration {
        Duration::from_millis(self.reader.tap_cooldown_ms)
    }

    /// Reader feedback settings.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        Feedback {
            beep_on_detect: self.reader.beep_on_detect,
            blink_on_tap: self.reader.blink_on_tap,
        }
    }
}
