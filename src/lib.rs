//! `qweather-rss` - daily weather forecast to RSS feed
//!
//! This library fetches the daily forecast for one fixed location from the
//! QWeather API and merges tomorrow's forecast into a persistent RSS 2.0
//! document, one deduplicated entry per date, newest first.

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod weather;

// Re-export core types for public API
pub use config::AppConfig;
pub use error::WeatherRssError;
pub use feed::{FeedDocument, FeedEntry, FeedMerger, MergeOutcome};
pub use models::{ForecastRecord, Location};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherRssError>;
