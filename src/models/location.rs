//! Location model for the fixed forecast location

use serde::{Deserialize, Serialize};

/// Forecast location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    /// Location identifier understood by the weather API
    pub id: String,
    /// Short name used in entry identifiers (e.g. `shanghai`)
    pub name: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Stable feed identifier for this location's forecast on `date`
    #[must_use]
    pub fn entry_id(&self, date: &str) -> String {
        format!("{}-weather-{}", self.name, date)
    }
}
