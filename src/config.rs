/// Watch configuration loader - parses pickup_watch.toml
///
/// Keeps the pickup location, the watched models and the notification
/// relays out of the code so they can change without recompiling.
///
/// Example:
/// ```toml
/// location = "10001"
/// models = ["MTUW3LL/A", "MTUX3LL/A"]
/// search_interval_seconds = 30
/// notify_endpoints = ["https://api.day.app/<device-key>"]
/// ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PICKUP_WATCH_CONFIG";

/// Config file used when `PICKUP_WATCH_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "pickup_watch.toml";

/// US education store fulfillment endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://www.apple.com/us-hed/shop/fulfillment-messages";

pub const DEFAULT_NOTIFY_SOUND: &str = "minuet";
pub const DEFAULT_NOTIFY_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_NOTIFY_WORKERS: usize = 4;

/// Startup errors. These are the only errors that stop the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Service configuration. Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Pickup location (zip code or city) passed to the search API.
    pub location: String,

    /// Part numbers to watch, in query order.
    #[serde(default)]
    pub models: Vec<String>,

    /// Pause between the end of one poll cycle and the start of the next.
    pub search_interval_seconds: u64,

    /// Base URLs of the push relays that receive in-stock notifications.
    #[serde(default)]
    pub notify_endpoints: Vec<String>,

    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Value of the `sound` query parameter on notification requests.
    #[serde(default = "default_notify_sound")]
    pub notify_sound: String,

    #[serde(default = "default_notify_timeout_seconds")]
    pub notify_timeout_seconds: u64,

    /// Upper bound on concurrent notification sends.
    #[serde(default = "default_notify_workers")]
    pub notify_workers: usize,
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_notify_sound() -> String {
    DEFAULT_NOTIFY_SOUND.to_string()
}

fn default_notify_timeout_seconds() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECONDS
}

fn default_notify_workers() -> usize {
    DEFAULT_NOTIFY_WORKERS
}

impl WatchConfig {
    /// Minimal config with every optional field at its default.
    pub fn new(
        location: impl Into<String>,
        models: Vec<String>,
        search_interval_seconds: u64,
        notify_endpoints: Vec<String>,
    ) -> Self {
        WatchConfig {
            location: location.into(),
            models,
            search_interval_seconds,
            notify_endpoints,
            search_url: default_search_url(),
            notify_sound: default_notify_sound(),
            notify_timeout_seconds: default_notify_timeout_seconds(),
            notify_workers: default_notify_workers(),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: WatchConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config named by `PICKUP_WATCH_CONFIG` (after applying any
    /// `.env` file), falling back to `pickup_watch.toml` in the working
    /// directory.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(&config_path())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.location.trim().is_empty() {
            return Err(ConfigError::Invalid("location must not be empty".to_string()));
        }
        if self.search_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "search_interval_seconds must be positive".to_string(),
            ));
        }
        if self.search_url.trim().is_empty() {
            return Err(ConfigError::Invalid("search_url must not be empty".to_string()));
        }
        if self.notify_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "notify_timeout_seconds must be positive".to_string(),
            ));
        }
        if self.notify_workers == 0 {
            return Err(ConfigError::Invalid("notify_workers must be positive".to_string()));
        }
        Ok(())
    }
}

/// Resolves the config file path from the environment.
pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
