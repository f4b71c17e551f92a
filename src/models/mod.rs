//! Data models for the feed generator
//!
//! This module contains the domain models organized by concern:
//! - Location: the fixed forecast location
//! - Forecast: one day of forecast data as delivered by the weather API

pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::ForecastRecord;
pub use location::Location;
