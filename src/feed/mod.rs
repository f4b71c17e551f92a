//! RSS feed module
//!
//! This module owns the persisted feed:
//! - Document: channel metadata and the ordered, deduplicated entry list
//! - Entry: deriving one published entry from a day's forecast
//! - Merger: the load, upsert, stamp and save cycle for one run
//! - XML: the RSS 2.0 wire format

pub mod document;
pub mod entry;
pub mod merger;
mod xml;

pub use document::{ChannelMeta, FeedDocument};
pub use entry::{FeedEntry, format_timestamp};
pub use merger::{FeedMerger, MergeOutcome};
