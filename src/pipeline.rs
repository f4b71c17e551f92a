//! One scheduled run: fetch tomorrow's forecast, then merge it into the feed
//!
//! Nothing is written unless the fetch and the merge both succeed.

use chrono::Utc;
use tracing::info;

use crate::Result;
use crate::config::AppConfig;
use crate::feed::{FeedMerger, MergeOutcome};
use crate::models::ForecastRecord;
use crate::weather::{WeatherClient, select_tomorrow};

/// Fetch and merge, writing the feed to the configured path
pub fn run(config: &AppConfig) -> Result<MergeOutcome> {
    let tomorrow = fetch_tomorrow(config)?;
    FeedMerger::new(config.feed.clone(), config.location()).run(&tomorrow)
}

/// Fetch and merge, returning the rendered feed instead of writing it
pub fn preview(config: &AppConfig) -> Result<String> {
    let tomorrow = fetch_tomorrow(config)?;
    let (document, outcome) =
        FeedMerger::new(config.feed.clone(), config.location()).merge(&tomorrow, Utc::now())?;
    info!("Dry run: would write entry {} ({} entries)", outcome.guid, outcome.entries);
    document.to_xml()
}

fn fetch_tomorrow(config: &AppConfig) -> Result<ForecastRecord> {
    let client = WeatherClient::new(&config.weather, &config.location())?;
    let records = client.fetch_daily()?;
    let tomorrow = select_tomorrow(&records)?;
    info!("Tomorrow is {}: {}", tomorrow.fx_date, tomorrow.text_day);
    Ok(tomorrow.clone())
}
