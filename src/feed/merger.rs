//! Read-modify-write of the feed file for one forecast
//!
//! Runs against the same output path must not overlap: there is no file
//! lock, and two concurrent merges can lose one of the updates.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use super::{ChannelMeta, FeedDocument, FeedEntry};
use crate::Result;
use crate::config::FeedConfig;
use crate::models::{ForecastRecord, Location};

/// Summary of a merge, for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Identifier of the entry that was written
    pub guid: String,
    /// Whether an entry with that identifier already existed
    pub replaced: bool,
    /// Entries in the resulting document
    pub entries: usize,
    /// Entries dropped by the retention limit
    pub dropped: usize,
}

/// Merges forecasts into the feed at the configured path
pub struct FeedMerger {
    config: FeedConfig,
    location: Location,
}

impl FeedMerger {
    #[must_use]
    pub fn new(config: FeedConfig, location: Location) -> Self {
        Self { config, location }
    }

    /// Load the current feed and fold `record` into it, without writing
    #[instrument(skip(self, record), fields(date = %record.fx_date))]
    pub fn merge(
        &self,
        record: &ForecastRecord,
        now: DateTime<Utc>,
    ) -> Result<(FeedDocument, MergeOutcome)> {
        let mut document =
            FeedDocument::load(&self.config.output_path, ChannelMeta::from(&self.config))?;

        let entry = FeedEntry::from_forecast(record, &self.location, &self.config, now);
        let guid = self.location.entry_id(&record.fx_date);

        let replaced = document.upsert(entry);
        let dropped = self
            .config
            .max_entries
            .map_or(0, |max| document.truncate(max));
        document.touch(now);

        let outcome = MergeOutcome {
            guid,
            replaced,
            entries: document.entries.len(),
            dropped,
        };
        Ok((document, outcome))
    }

    /// Merge `record` at `now` and write the result to the output path
    pub fn run_at(&self, record: &ForecastRecord, now: DateTime<Utc>) -> Result<MergeOutcome> {
        let (document, outcome) = self.merge(record, now)?;
        document.save(&self.config.output_path)?;

        info!(
            "{} entry {} ({} entries, {} dropped)",
            if outcome.replaced { "Replaced" } else { "Added" },
            outcome.guid,
            outcome.entries,
            outcome.dropped
        );
        Ok(outcome)
    }

    /// Merge `record` now and write the result
    pub fn run(&self, record: &ForecastRecord) -> Result<MergeOutcome> {
        self.run_at(record, Utc::now())
    }
}
