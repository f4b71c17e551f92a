//! Error types and handling for the feed generator

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for a forecast-to-feed run
#[derive(Error, Debug)]
pub enum WeatherRssError {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the weather API
    #[error("Network error: {message}")]
    Network { message: String },

    /// Weather API answered with a non-success HTTP status
    #[error("HTTP error: weather API returned status {status}")]
    Http { status: u16 },

    /// Weather API envelope carried a non-success code
    #[error("API error (code {code}): {message}")]
    Api { code: String, message: String },

    /// Fewer daily records than needed to pick tomorrow
    #[error("Insufficient forecast data: expected at least 2 daily records, received {received}")]
    InsufficientData { received: usize },

    /// Feed serialization errors
    #[error("XML error: {message}")]
    Xml { message: String },

    /// I/O operation errors on the feed file
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherRssError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new API envelope error
    pub fn api<C: Into<String>, S: Into<String>>(code: C, message: S) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new XML error
    pub fn xml<S: Into<String>>(message: S) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Process exit code for this failure
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            WeatherRssError::Config { .. } => 2,
            _ => 1,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherRssError::Config { message } => {
                format!("Configuration error: {message}. Check the config file and QWEATHER_* environment variables.")
            }
            WeatherRssError::Network { .. } | WeatherRssError::Http { .. } => {
                "Unable to reach the weather API. The next scheduled run will try again.".to_string()
            }
            WeatherRssError::Api { code, message } => {
                format!("Weather API rejected the request (code {code}): {message}")
            }
            WeatherRssError::InsufficientData { received } => {
                format!("Weather API returned {received} daily record(s); tomorrow's forecast is unavailable.")
            }
            WeatherRssError::Xml { .. } => "Failed to render the feed document.".to_string(),
            WeatherRssError::Io { path, .. } => {
                format!("File operation failed on {}. Please check file permissions.", path.display())
            }
        }
    }
}

impl From<quick_xml::se::SeError> for WeatherRssError {
    fn from(err: quick_xml::se::SeError) -> Self {
        WeatherRssError::xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = WeatherRssError::config("missing API key");
        assert!(matches!(config_err, WeatherRssError::Config { .. }));

        let api_err = WeatherRssError::api("401", "invalid key");
        assert!(matches!(api_err, WeatherRssError::Api { .. }));

        let net_err = WeatherRssError::network("connection refused");
        assert!(matches!(net_err, WeatherRssError::Network { .. }));
    }

    #[test]
    fn test_api_error_reports_code_and_message() {
        let err = WeatherRssError::api("402", "over quota");
        let text = err.to_string();
        assert!(text.contains("402"));
        assert!(text.contains("over quota"));
        assert!(err.user_message().contains("402"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(WeatherRssError::config("x").exit_code(), 2);
        assert_eq!(WeatherRssError::Http { status: 500 }.exit_code(), 1);
        assert_eq!(WeatherRssError::InsufficientData { received: 1 }.exit_code(), 1);
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = WeatherRssError::io(Path::new("/tmp/weather.xml"), io_err);
        assert!(err.to_string().contains("/tmp/weather.xml"));
        assert!(err.user_message().contains("permissions"));
    }
}
