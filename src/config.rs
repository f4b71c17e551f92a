//! Configuration management for the feed generator
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `QWEATHER_RSS_*` environment variables, then the conventional flat
//! variables (`QWEATHER_API_KEY`, `QWEATHER_API_HOST`, `QWEATHER_LOCATION`,
//! `RSS_OUTPUT_PATH`). The result is validated once and passed by reference
//! into the fetcher and the merger.

use crate::models::Location;
use crate::{Result, WeatherRssError};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "qweather-rss.toml";

/// Prefix for structured environment overrides
const ENV_PREFIX: &str = "QWEATHER_RSS";

/// Flat environment variables and the config keys they override
const FLAT_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("QWEATHER_API_KEY", "weather.api_key"),
    ("QWEATHER_API_HOST", "weather.api_host"),
    ("QWEATHER_LOCATION", "location.id"),
    ("RSS_OUTPUT_PATH", "feed.output_path"),
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// The fixed forecast location
    #[serde(default)]
    pub location: LocationConfig,
    /// Feed output configuration
    #[serde(default)]
    pub feed: FeedConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API host, with or without scheme
    #[serde(default)]
    pub api_host: String,
    /// API key passed as the `key` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Response language
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Forecast window requested from `/v7/weather/{days}d`
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Fixed location the feed is generated for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// API location identifier
    #[serde(default = "default_location_id")]
    pub id: String,
    /// Slug used in entry identifiers
    #[serde(default = "default_location_name")]
    pub name: String,
}

/// Feed document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Where the RSS file is read from and written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_feed_title")]
    pub title: String,
    #[serde(default = "default_feed_link")]
    pub link: String,
    #[serde(default = "default_feed_description")]
    pub description: String,
    #[serde(default = "default_feed_language")]
    pub language: Option<String>,
    /// Public URL of the feed itself, emitted as `atom:link rel="self"`
    #[serde(default)]
    pub self_link: Option<String>,
    /// Base URL for condition icons; `{base}/{code}.svg`
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
    /// Keep at most this many entries (unbounded when unset)
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_lang() -> String {
    "en".to_string()
}

fn default_forecast_days() -> u32 {
    3
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("qweather-rss/{}", env!("CARGO_PKG_VERSION"))
}

fn default_location_id() -> String {
    "101020100".to_string()
}

fn default_location_name() -> String {
    "shanghai".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("weather.xml")
}

fn default_feed_title() -> String {
    "Shanghai Weather Forecast".to_string()
}

fn default_feed_link() -> String {
    "https://www.qweather.com/weather/shanghai-101020100.html".to_string()
}

fn default_feed_description() -> String {
    "Tomorrow's weather forecast for Shanghai".to_string()
}

fn default_feed_language() -> Option<String> {
    Some("en".to_string())
}

fn default_icon_base_url() -> String {
    "https://cdn.jsdelivr.net/npm/qweather-icons@1.6.0/icons".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            api_key: String::new(),
            lang: default_lang(),
            forecast_days: default_forecast_days(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            id: default_location_id(),
            name: default_location_name(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            title: default_feed_title(),
            link: default_feed_link(),
            description: default_feed_description(),
            language: default_feed_language(),
            self_link: None,
            icon_base_url: default_icon_base_url(),
            max_entries: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and an optional file
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::load_from(config_path, &vars)
    }

    /// Load configuration from an explicit set of environment variables
    ///
    /// The result is not validated; call [`AppConfig::validate`] once any
    /// command-line overrides have been applied.
    pub fn load_from(config_path: Option<PathBuf>, vars: &HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(WeatherRssError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    builder = builder.add_source(
                        File::from(fallback)
                            .required(false)
                            .format(FileFormat::Toml),
                    );
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect())),
        );

        for (var, key) in FLAT_ENV_OVERRIDES {
            let value = vars.get(var).filter(|v| !v.is_empty()).cloned();
            builder = builder
                .set_override_option(key, value)
                .map_err(|e| WeatherRssError::config(format!("invalid override {var}: {e}")))?;
        }

        let settings = builder
            .build()
            .map_err(|e| WeatherRssError::config(format!("failed to build configuration: {e}")))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| WeatherRssError::config(format!("failed to deserialize configuration: {e}")))?;

        Ok(config)
    }

    /// The configured location as a domain value
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.location.id.clone(), self.location.name.clone())
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// API key and host must both be present before any request is made
    pub fn validate_api_credentials(&self) -> Result<()> {
        if self.weather.api_key.trim().is_empty() {
            return Err(WeatherRssError::config(
                "weather API key is missing (set QWEATHER_API_KEY)",
            ));
        }
        if self.weather.api_host.trim().is_empty() {
            return Err(WeatherRssError::config(
                "weather API host is missing (set QWEATHER_API_HOST)",
            ));
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        let valid_days = [3, 7, 10, 15, 30];
        if !valid_days.contains(&self.weather.forecast_days) {
            return Err(WeatherRssError::config(format!(
                "forecast_days must be one of {valid_days:?}, got {}",
                self.weather.forecast_days
            )));
        }

        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(WeatherRssError::config(
                "weather API timeout must be between 1 and 300 seconds",
            ));
        }

        if self.feed.max_entries == Some(0) {
            return Err(WeatherRssError::config("feed max_entries must be at least 1"));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherRssError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.location.id.trim().is_empty() || self.location.name.trim().is_empty() {
            return Err(WeatherRssError::config("location id and name must not be empty"));
        }

        if self.feed.output_path.as_os_str().is_empty() {
            return Err(WeatherRssError::config("feed output path must not be empty"));
        }

        Ok(())
    }
}
