//! Weather API client for the QWeather daily forecast endpoint
//!
//! Issues a single blocking request per run. There is no retry loop here:
//! a failed run is retried by the next scheduled invocation.

use crate::config::WeatherConfig;
use crate::models::{ForecastRecord, Location};
use crate::{Result, WeatherRssError};
use reqwest::blocking::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Envelope code the API uses for success
const SUCCESS_CODE: &str = "200";

/// Daily records needed to select tomorrow (index 1)
const MIN_DAILY_RECORDS: usize = 2;

/// Client for the daily forecast endpoint
pub struct WeatherClient {
    /// HTTP client
    client: Client,
    /// Scheme + host, no trailing slash
    base_url: String,
    api_key: String,
    lang: String,
    forecast_days: u32,
    location: Location,
}

impl WeatherClient {
    /// Create a new client; fails without a key or host, before any request
    pub fn new(config: &WeatherConfig, location: &Location) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(WeatherRssError::config("weather API key is missing"));
        }
        if config.api_host.trim().is_empty() {
            return Err(WeatherRssError::config("weather API host is missing"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .map_err(|e| WeatherRssError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_host(&config.api_host),
            api_key: config.api_key.trim().to_string(),
            lang: config.lang.clone(),
            forecast_days: config.forecast_days,
            location: location.clone(),
        })
    }

    /// Fetch the daily forecast; index 0 is today, index 1 is tomorrow
    #[instrument(skip(self), fields(location = %self.location.id))]
    pub fn fetch_daily(&self) -> Result<Vec<ForecastRecord>> {
        info!("Fetching {}-day forecast for {}", self.forecast_days, self.location.name);
        let start_time = Instant::now();

        let response = self.make_request(&self.request_url())?;

        let envelope: qweather::DailyResponse = response.json().map_err(|e| {
            error!("Failed to parse forecast response: {}", e);
            WeatherRssError::api("invalid-response", format!("undecodable forecast body: {e}"))
        })?;

        let records = envelope.into_records()?;

        info!(
            "Retrieved {} daily records in {:.3}s",
            records.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(records)
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v7/weather/{}d?location={}&key={}&lang={}",
            self.base_url,
            self.forecast_days,
            urlencoding::encode(&self.location.id),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.lang),
        )
    }

    /// Single attempt; any non-success status is fatal for this run
    fn make_request(&self, url: &str) -> Result<Response> {
        debug!("Weather API request URL: {}", redact_key(url, &self.api_key));
        let request_start = Instant::now();

        let response = self.client.get(url).send().map_err(|e| {
            error!("Weather API request failed: {}", e);
            WeatherRssError::network(e.to_string())
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            request_start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            error!("Weather API returned HTTP {}", status);
            return Err(WeatherRssError::Http {
                status: status.as_u16(),
            });
        }

        if request_start.elapsed().as_secs() > 5 {
            warn!(
                "Slow API response detected: {:.3}s",
                request_start.elapsed().as_secs_f64()
            );
        }

        Ok(response)
    }
}

/// Pick tomorrow's record out of a validated daily list
pub fn select_tomorrow(records: &[ForecastRecord]) -> Result<&ForecastRecord> {
    records
        .get(1)
        .ok_or(WeatherRssError::InsufficientData {
            received: records.len(),
        })
}

/// Prepend `https://` when the host has no scheme and drop trailing slashes
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn redact_key(url: &str, key: &str) -> String {
    url.replace(&*urlencoding::encode(key), "***")
}

/// QWeather response envelope and validation
mod qweather {
    use super::{ForecastRecord, MIN_DAILY_RECORDS, SUCCESS_CODE};
    use crate::{Result, WeatherRssError};
    use serde::Deserialize;

    /// Response of `/v7/weather/{days}d`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyResponse {
        pub code: String,
        #[serde(default)]
        pub msg: Option<String>,
        #[serde(default)]
        pub update_time: Option<String>,
        #[serde(default)]
        pub daily: Option<Vec<ForecastRecord>>,
    }

    impl DailyResponse {
        /// Check the envelope code and payload length
        pub fn into_records(self) -> Result<Vec<ForecastRecord>> {
            if self.code != SUCCESS_CODE {
                return Err(WeatherRssError::api(
                    self.code,
                    self.msg.unwrap_or_else(|| "no message".to_string()),
                ));
            }

            if let Some(update_time) = &self.update_time {
                tracing::debug!("Forecast last updated upstream at {}", update_time);
            }

            let daily = self.daily.unwrap_or_default();
            if daily.len() < MIN_DAILY_RECORDS {
                return Err(WeatherRssError::InsufficientData {
                    received: daily.len(),
                });
            }
            Ok(daily)
        }
    }
}
