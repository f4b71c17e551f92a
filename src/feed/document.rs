//! In-memory feed document: channel metadata plus the ordered entry list

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::entry::{FeedEntry, format_timestamp};
use super::xml;
use crate::config::FeedConfig;
use crate::{Result, WeatherRssError};

/// Channel-level metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: Option<String>,
    /// Public URL of the feed, rendered as `atom:link rel="self"`
    pub self_link: Option<String>,
    pub last_build_date: Option<String>,
}

impl From<&FeedConfig> for ChannelMeta {
    fn from(config: &FeedConfig) -> Self {
        Self {
            title: config.title.clone(),
            link: config.link.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            self_link: config.self_link.clone(),
            last_build_date: None,
        }
    }
}

/// The persisted feed; entries are most-recent-first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub channel: ChannelMeta,
    pub entries: Vec<FeedEntry>,
}

impl FeedDocument {
    /// Empty document with the given channel metadata
    #[must_use]
    pub fn new(channel: ChannelMeta) -> Self {
        Self {
            channel,
            entries: Vec::new(),
        }
    }

    /// Load the feed at `path`, or start a new one.
    ///
    /// A missing, unparseable or channel-less file yields an empty document.
    /// Only genuine read failures (permissions, a directory in the way) are
    /// errors. Channel metadata is always taken from `channel`.
    pub fn load(path: &Path, channel: ChannelMeta) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No existing feed at {}, starting a new one", path.display());
                return Ok(Self::new(channel));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(
                    "Existing feed at {} is not valid UTF-8, starting a new one",
                    path.display()
                );
                return Ok(Self::new(channel));
            }
            Err(e) => return Err(WeatherRssError::io(path, e)),
        };

        match xml::parse_entries(&content) {
            Ok(entries) => {
                let mut document = Self { channel, entries };
                let dropped = document.drop_duplicate_guids();
                if dropped > 0 {
                    warn!("Dropped {} duplicate entries from {}", dropped, path.display());
                }
                debug!(
                    "Loaded {} existing entries from {}",
                    document.entries.len(),
                    path.display()
                );
                Ok(document)
            }
            Err(e) => {
                warn!(
                    "Discarding unusable feed at {} ({}), starting a new one",
                    path.display(),
                    e
                );
                Ok(Self::new(channel))
            }
        }
    }

    /// Put `entry` at the front, removing every entry with the same identifier.
    ///
    /// Returns whether an existing entry was replaced.
    pub fn upsert(&mut self, entry: FeedEntry) -> bool {
        let before = self.entries.len();
        if let Some(guid) = entry.guid.as_deref() {
            self.entries.retain(|existing| !existing.has_guid(guid));
        }
        let replaced = self.entries.len() < before;
        self.entries.insert(0, entry);
        replaced
    }

    /// Keep at most `max` entries, dropping the oldest; returns how many went
    pub fn truncate(&mut self, max: usize) -> usize {
        let dropped = self.entries.len().saturating_sub(max);
        self.entries.truncate(max);
        dropped
    }

    /// Stamp the channel's last-build date
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.channel.last_build_date = Some(format_timestamp(now));
    }

    #[cfg(test)]
    fn find(&self, guid: &str) -> Option<&FeedEntry> {
        self.entries.iter().find(|entry| entry.has_guid(guid))
    }

    /// Render as an indented RSS 2.0 document
    pub fn to_xml(&self) -> Result<String> {
        xml::render(self)
    }

    /// Replace the file at `path` with this document.
    ///
    /// Writes a sibling temporary file and renames it over the target so the
    /// old content stays intact if rendering or writing fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = self.to_xml()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WeatherRssError::io(parent, e))?;
        }

        let temp_path = temp_path_for(path);
        fs::write(&temp_path, rendered).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WeatherRssError::io(&temp_path, e)
        })?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WeatherRssError::io(path, e)
        })?;

        info!("Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    fn drop_duplicate_guids(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::new();
        self.entries.retain(|entry| match entry.guid.as_deref() {
            Some(guid) => seen.insert(guid.to_string()),
            None => true,
        });
        before - self.entries.len()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed.xml".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
