//! Analysis configuration: tickers, event window, tariff event list.
//!
//! Loaded from TOML. When no file is supplied the built-in event list is used.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tariffscope_core::domain::TariffEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Trading-day window around each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    /// Trading days emitted before the event.
    #[serde(default = "default_span")]
    pub before: u32,
    /// Trading days emitted after the event.
    #[serde(default = "default_span")]
    pub after: u32,
    /// Minimum trading days that must exist before the baseline. Defaults to `before`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_before: Option<u32>,
    /// Minimum trading days that must exist after the baseline. Defaults to `after`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_after: Option<u32>,
    /// Calendar days to search back from the event date for a baseline.
    #[serde(default = "default_lookback")]
    pub lookback_days: u32,
}

fn default_span() -> u32 {
    10
}

fn default_lookback() -> u32 {
    7
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            before: default_span(),
            after: default_span(),
            min_before: None,
            min_after: None,
            lookback_days: default_lookback(),
        }
    }
}

impl WindowConfig {
    /// Symmetric window with the default lookback.
    pub fn symmetric(days: u32) -> Self {
        Self {
            before: days,
            after: days,
            ..Self::default()
        }
    }

    pub fn required_before(&self) -> usize {
        self.min_before.unwrap_or(self.before) as usize
    }

    pub fn required_after(&self) -> usize {
        self.min_after.unwrap_or(self.after) as usize
    }
}

/// Complete input for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub tickers: Vec<String>,
    #[serde(default)]
    pub window: WindowConfig,
    pub events: Vec<TariffEvent>,
}

impl AnalysisConfig {
    /// Parse and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("at least one ticker is required".into()));
        }
        if let Some(t) = self.tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("empty ticker in list: {t:?}")));
        }
        let mut seen_tickers = HashSet::new();
        for t in &self.tickers {
            if !seen_tickers.insert(t.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate ticker '{t}'")));
            }
        }

        if self.events.is_empty() {
            return Err(ConfigError::Invalid("at least one event is required".into()));
        }
        let mut seen_dates = HashSet::new();
        for ev in &self.events {
            if !seen_dates.insert(ev.event_date) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate event date {}",
                    ev.event_date
                )));
            }
        }

        let w = &self.window;
        if w.after == 0 {
            return Err(ConfigError::Invalid("window.after must be at least 1".into()));
        }
        if w.required_before() > w.before as usize {
            return Err(ConfigError::Invalid(format!(
                "window.min_before ({}) exceeds window.before ({})",
                w.required_before(),
                w.before
            )));
        }
        if w.required_after() > w.after as usize {
            return Err(ConfigError::Invalid(format!(
                "window.min_after ({}) exceeds window.after ({})",
                w.required_after(),
                w.after
            )));
        }
        Ok(())
    }

    /// Earliest and latest configured event dates.
    pub fn event_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events.iter().map(|e| e.event_date).min()?;
        let last = self.events.iter().map(|e| e.event_date).max()?;
        Some((first, last))
    }

    /// Built-in configuration: SPY around five U.S. tariff announcements.
    pub fn builtin() -> Self {
        Self {
            tickers: vec!["SPY".to_string()],
            window: WindowConfig::default(),
            events: builtin_events(),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Known U.S. tariff announcements, oldest first.
pub fn builtin_events() -> Vec<TariffEvent> {
    vec![
        TariffEvent::new(
            date(2018, 3, 1),
            "Steel and Aluminum Tariffs (25% on Steel, 10% on Aluminum)",
        )
        .with_source_note("Tariffs on steel and aluminum imports, exemptions added later")
        .with_country("Multiple Countries"),
        TariffEvent::new(date(2018, 7, 6), "China Tariffs Phase 1 ($34 Billion on Goods)")
            .with_source_note("First list of Chinese imports under Section 301")
            .with_country("China"),
        TariffEvent::new(
            date(2018, 9, 17),
            "China Tariffs Phase 2 ($200 Billion Additional Goods)",
        )
        .with_source_note("Second Section 301 list announced")
        .with_country("China"),
        TariffEvent::new(
            date(2019, 5, 10),
            "China Tariff Increase (25% on $200 Billion Goods)",
        )
        .with_source_note("Rate on the $200 billion list raised from 10% to 25%")
        .with_country("China"),
        TariffEvent::new(
            date(2025, 3, 3),
            "Proposed Tariffs on Canada, Mexico, and China (10-25%)",
        )
        .with_source_note("Announced ahead of the March 4 effective date")
        .with_country("Canada, Mexico, and China"),
    ]
}
