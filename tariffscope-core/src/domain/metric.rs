//! Derived per-offset metrics and the baseline they are measured against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference close for one (event, ticker) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Trading day the close was taken from.
    pub date: NaiveDate,
    pub close: f64,
    /// Position of the baseline record in its ticker's sorted series.
    pub index: usize,
    /// True when the event date was not a trading day and an earlier day was used.
    pub substituted: bool,
}

/// One row of the metrics export: an (event, ticker, offset) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWindowMetric {
    pub event_date: NaiveDate,
    pub ticker: String,
    /// Trading-day offset from the baseline; negative before the event.
    pub offset_days: i32,
    /// Percent change of the close at this offset versus the baseline close.
    pub pct_change_from_event: f64,
    /// Close at this offset is at or above baseline (post-event offsets only).
    pub is_recovered: bool,
    /// Std dev of daily percent returns between the baseline and this offset.
    pub volatility_window: f64,
}
