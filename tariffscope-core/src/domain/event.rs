//! TariffEvent: a dated tariff announcement used as an analysis anchor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tariff announcement. Supplied by configuration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffEvent {
    pub event_date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub source_note: String,
    /// Countries targeted by the measure, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl TariffEvent {
    pub fn new(event_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            event_date,
            description: description.into(),
            source_note: String::new(),
            country: None,
        }
    }

    pub fn with_source_note(mut self, note: impl Into<String>) -> Self {
        self.source_note = note.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}
