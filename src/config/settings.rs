//! Application settings loading from fitness.toml
//!
//! Every key is optional. A missing file yields the defaults, so a fresh install
//! runs without any configuration. The database URL from the environment
//! (see [`env_database_url`]) always wins over the file.

use crate::config::database::{DEFAULT_DATABASE_URL, env_database_url};
use crate::core::meditation::MeditationType;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "fitness.toml";

/// Configuration structure representing the entire fitness.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Record store location
    pub database: DatabaseSettings,
    /// Meditation timer defaults
    pub timer: TimerSettings,
}

/// `[database]` section
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `SeaORM` connection URL, e.g. `sqlite://data/fitness.sqlite?mode=rwc`
    pub url: Option<String>,
}

/// `[timer]` section
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    /// Preset selected when the timer is created
    pub default_minutes: u32,
    /// Meditation type selected when the timer is created
    pub default_type: String,
    /// Length of one countdown step in milliseconds
    pub tick_millis: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_minutes: 5,
            default_type: MeditationType::default().to_string(),
            tick_millis: 1000,
        }
    }
}

impl Settings {
    /// Resolves the database URL: environment, then file, then the built-in default.
    #[must_use]
    pub fn database_url(&self) -> String {
        env_database_url()
            .or_else(|| self.database.url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }
}

impl TimerSettings {
    /// Parses the configured default meditation type.
    ///
    /// # Errors
    /// Returns `Error::Config` if the name is not one of the known types.
    pub fn meditation_type(&self) -> Result<MeditationType> {
        self.default_type.parse().map_err(|_| Error::Config {
            message: format!("Unknown meditation type: {}", self.default_type),
        })
    }

    /// Countdown step as a [`Duration`]; zero is bumped to one millisecond.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from the default location (./fitness.toml), falling back to
/// defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new(DEFAULT_SETTINGS_PATH);
    if path.exists() {
        load_settings(path)
    } else {
        tracing::debug!("No {} found, using default settings", DEFAULT_SETTINGS_PATH);
        Ok(Settings::default())
    }
}
