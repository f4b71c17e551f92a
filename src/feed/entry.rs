//! Feed entry derived from a single day's forecast

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;

use crate::config::FeedConfig;
use crate::models::{ForecastRecord, Location};

/// `Mon, 02 Jan 2006 15:04:05 GMT`
const RFC822_GMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format an instant the way RSS `pubDate`/`lastBuildDate` expect
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(RFC822_GMT).to_string()
}

/// One published forecast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    /// HTML detail block
    pub description: String,
    /// Deduplication key, `<location>-weather-<date>`
    pub guid: Option<String>,
    pub pub_date: Option<String>,
}

impl FeedEntry {
    /// Build the entry for `record`, published at `now`
    #[must_use]
    pub fn from_forecast(
        record: &ForecastRecord,
        location: &Location,
        config: &FeedConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title: format!(
                "{}: {}, {}",
                record.fx_date,
                record.text_day,
                record.format_temperature()
            ),
            link: Some(config.link.clone()),
            description: describe(record, &config.icon_base_url),
            guid: Some(location.entry_id(&record.fx_date)),
            pub_date: Some(format_timestamp(now)),
        }
    }

    /// Whether this entry carries the given identifier
    #[must_use]
    pub fn has_guid(&self, guid: &str) -> bool {
        self.guid.as_deref() == Some(guid)
    }
}

/// Labeled detail lines joined with `<br/>`
fn describe(record: &ForecastRecord, icon_base_url: &str) -> String {
    let lines = [
        ("Date", escape(&record.fx_date).into_owned()),
        (
            "Day",
            with_icon(&record.text_day, &record.icon_day, icon_base_url),
        ),
        (
            "Night",
            with_icon(&record.text_night, &record.icon_night, icon_base_url),
        ),
        ("Temperature", escape(&record.format_temperature()).into_owned()),
        (
            "Sunrise/Sunset",
            format!("{} / {}", escape(&record.sunrise), escape(&record.sunset)),
        ),
        (
            "Moonrise/Moonset",
            format!(
                "{} / {} ({})",
                escape(&record.moonrise),
                escape(&record.moonset),
                escape(&record.moon_phase)
            ),
        ),
        ("Day wind", escape(&record.format_wind_day()).into_owned()),
        ("Night wind", escape(&record.format_wind_night()).into_owned()),
        ("Humidity", format!("{}%", escape(&record.humidity))),
        ("Precipitation", format!("{} mm", escape(&record.precip))),
        ("Pressure", format!("{} hPa", escape(&record.pressure))),
        ("Visibility", format!("{} km", escape(&record.vis))),
        ("Cloud cover", format!("{}%", escape(&record.cloud))),
        ("UV index", escape(&record.uv_index).into_owned()),
    ];

    lines
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn with_icon(text: &str, icon: &str, icon_base_url: &str) -> String {
    let text = escape(text);
    if icon.is_empty() {
        return text.into_owned();
    }
    format!(
        "{text} <img src=\"{}/{}.svg\" alt=\"{text}\" width=\"24\" height=\"24\"/>",
        icon_base_url.trim_end_matches('/'),
        escape(icon)
    )
}
