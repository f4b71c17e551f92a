//! Daily forecast record and display methods

use serde::{Deserialize, Serialize};

/// One calendar day of forecast data for one location.
///
/// Every value is passed through verbatim from the weather API; nothing is
/// parsed or range-checked. Fields missing from the payload are empty.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastRecord {
    /// Forecast date, `YYYY-MM-DD`
    pub fx_date: String,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub moon_phase_icon: String,
    /// Maximum temperature in Celsius
    pub temp_max: String,
    /// Minimum temperature in Celsius
    pub temp_min: String,
    pub icon_day: String,
    pub text_day: String,
    pub icon_night: String,
    pub text_night: String,
    /// Day wind direction in degrees
    pub wind360_day: String,
    pub wind_dir_day: String,
    /// Day wind force on the Beaufort scale (may be a range like `1-3`)
    pub wind_scale_day: String,
    /// Day wind speed in km/h
    pub wind_speed_day: String,
    pub wind360_night: String,
    pub wind_dir_night: String,
    pub wind_scale_night: String,
    pub wind_speed_night: String,
    /// Relative humidity in percent
    pub humidity: String,
    /// Precipitation in mm
    pub precip: String,
    /// Pressure in hPa
    pub pressure: String,
    /// Visibility in km
    pub vis: String,
    /// Cloud cover in percent
    pub cloud: String,
    pub uv_index: String,
}

impl ForecastRecord {
    /// Format temperature range with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C - {}°C", self.temp_min, self.temp_max)
    }

    /// Format daytime wind information
    #[must_use]
    pub fn format_wind_day(&self) -> String {
        format_wind(&self.wind_dir_day, &self.wind360_day, &self.wind_scale_day, &self.wind_speed_day)
    }

    /// Format nighttime wind information
    #[must_use]
    pub fn format_wind_night(&self) -> String {
        format_wind(
            &self.wind_dir_night,
            &self.wind360_night,
            &self.wind_scale_night,
            &self.wind_speed_night,
        )
    }
}

fn format_wind(direction: &str, degrees: &str, scale: &str, speed: &str) -> String {
    let heading = if degrees.is_empty() {
        direction.to_string()
    } else {
        format!("{direction} ({degrees}°)")
    };
    format!("{heading}, scale {scale}, {speed} km/h")
}
