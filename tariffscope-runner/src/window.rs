//! Event-window metrics engine.
//!
//! For each (event, ticker) pair: locate the baseline close on or before the
//! event date, check that enough trading days surround it, then emit one
//! `EventWindowMetric` per trading-day offset plus a per-event summary.
//! Everything here is a pure function over sorted, immutable slices.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tariffscope_core::domain::{Baseline, EventWindowMetric, PriceRecord, TariffEvent};
use thiserror::Error;

use crate::config::WindowConfig;
use crate::data_loader::LoadedData;
use crate::horizons::{compute_horizons, HorizonMetric};
use crate::stats::{pct_change, pct_returns, std_dev};

/// Per-pair failures. The pair contributes no rows and is reported as an omission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error(
        "no trading day for '{ticker}' within {lookback_days} days on or before {event_date}"
    )]
    BaselineMissing {
        ticker: String,
        event_date: NaiveDate,
        lookback_days: u32,
    },

    #[error("baseline close for '{ticker}' on {date} is not a positive price ({close})")]
    InvalidBaseline {
        ticker: String,
        date: NaiveDate,
        close: f64,
    },

    #[error(
        "insufficient window data for '{ticker}' around {event_date}: \
         {before} days before / {after} after, need {required_before} / {required_after}"
    )]
    InsufficientWindowData {
        ticker: String,
        event_date: NaiveDate,
        before: usize,
        after: usize,
        required_before: usize,
        required_after: usize,
    },
}

/// Per (event, ticker) summary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_date: NaiveDate,
    pub ticker: String,
    pub description: String,
    pub baseline_date: NaiveDate,
    pub baseline_close: f64,
    pub baseline_substituted: bool,
    /// Worst post-event percent change versus baseline (<= 0).
    pub max_drawdown_pct: f64,
    /// Trading days until the close is back at baseline; 0 if it never fell
    /// below, `None` if it had not recovered by the end of the window.
    pub recovery_days: Option<u32>,
    /// Std dev of daily percent returns across the emitted window.
    pub window_volatility_pct: f64,
}

/// Everything computed for one (event, ticker) pair.
#[derive(Debug, Clone)]
pub struct EventWindow {
    pub event: TariffEvent,
    pub ticker: String,
    pub baseline: Baseline,
    pub metrics: Vec<EventWindowMetric>,
    pub summary: EventSummary,
    pub horizons: Vec<HorizonMetric>,
}

/// A pair that produced no rows, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Omission {
    pub event_date: NaiveDate,
    pub ticker: String,
    pub reason: String,
}

/// Output of the metrics stage for a whole run.
#[derive(Debug, Clone, Default)]
pub struct MetricsRun {
    pub windows: Vec<EventWindow>,
    pub omissions: Vec<Omission>,
}

impl MetricsRun {
    /// All metric rows, in event order then ticker order then offset order.
    pub fn metrics(&self) -> impl Iterator<Item = &EventWindowMetric> {
        self.windows.iter().flat_map(|w| w.metrics.iter())
    }

    pub fn metric_count(&self) -> usize {
        self.windows.iter().map(|w| w.metrics.len()).sum()
    }

    pub fn summaries(&self) -> impl Iterator<Item = &EventSummary> {
        self.windows.iter().map(|w| &w.summary)
    }

    pub fn horizons(&self) -> impl Iterator<Item = &HorizonMetric> {
        self.windows.iter().flat_map(|w| w.horizons.iter())
    }
}

/// Locate the baseline: the latest record dated on or before `event_date`.
///
/// Binary search over `series`, which must be sorted ascending by date.
pub fn find_baseline(
    ticker: &str,
    series: &[PriceRecord],
    event_date: NaiveDate,
    lookback_days: u32,
) -> Result<Baseline, MetricsError> {
    let missing = || MetricsError::BaselineMissing {
        ticker: ticker.to_string(),
        event_date,
        lookback_days,
    };

    let after = series.partition_point(|r| r.date <= event_date);
    let index = after.checked_sub(1).ok_or_else(missing)?;
    let rec = &series[index];

    if rec.date < event_date - Duration::days(lookback_days as i64) {
        return Err(missing());
    }
    if !(rec.close.is_finite() && rec.close > 0.0) {
        return Err(MetricsError::InvalidBaseline {
            ticker: ticker.to_string(),
            date: rec.date,
            close: rec.close,
        });
    }

    Ok(Baseline {
        date: rec.date,
        close: rec.close,
        index,
        substituted: rec.date != event_date,
    })
}

/// Compute the offset rows and summary for one event and one ticker.
pub fn compute_event_window(
    event: &TariffEvent,
    ticker: &str,
    series: &[PriceRecord],
    window: &WindowConfig,
) -> Result<EventWindow, MetricsError> {
    let baseline = find_baseline(ticker, series, event.event_date, window.lookback_days)?;
    if baseline.substituted {
        tracing::warn!(
            ticker,
            event_date = %event.event_date,
            baseline_date = %baseline.date,
            "event date is not a trading day; using prior close as baseline"
        );
    }

    let b = baseline.index;
    let available_before = b;
    let available_after = series.len() - 1 - b;
    if available_before < window.required_before() || available_after < window.required_after() {
        return Err(MetricsError::InsufficientWindowData {
            ticker: ticker.to_string(),
            event_date: event.event_date,
            before: available_before,
            after: available_after,
            required_before: window.required_before(),
            required_after: window.required_after(),
        });
    }

    let lo = b - available_before.min(window.before as usize);
    let hi = b + available_after.min(window.after as usize);
    let closes: Vec<f64> = series[lo..=hi].iter().map(|r| r.close).collect();
    let returns = pct_returns(&closes);
    let base = baseline.close;
    // Baseline position inside `closes`.
    let pivot = b - lo;

    let metrics: Vec<EventWindowMetric> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let offset = i as i64 - pivot as i64;
            let (from, to) = (i.min(pivot), i.max(pivot));
            EventWindowMetric {
                event_date: event.event_date,
                ticker: ticker.to_string(),
                offset_days: offset as i32,
                pct_change_from_event: if offset == 0 { 0.0 } else { pct_change(close, base) },
                is_recovered: offset > 0 && close >= base,
                volatility_window: std_dev(&returns[from..to]),
            }
        })
        .collect();

    let post = &closes[pivot..];
    let max_drawdown_pct = post
        .iter()
        .map(|&c| pct_change(c, base))
        .fold(0.0_f64, f64::min);

    let summary = EventSummary {
        event_date: event.event_date,
        ticker: ticker.to_string(),
        description: event.description.clone(),
        baseline_date: baseline.date,
        baseline_close: base,
        baseline_substituted: baseline.substituted,
        max_drawdown_pct,
        recovery_days: recovery_days(post, base),
        window_volatility_pct: std_dev(&returns),
    };

    tracing::debug!(
        ticker,
        event_date = %event.event_date,
        rows = metrics.len(),
        "computed event window"
    );

    Ok(EventWindow {
        event: event.clone(),
        ticker: ticker.to_string(),
        baseline,
        horizons: compute_horizons(ticker, series, &baseline, event.event_date),
        metrics,
        summary,
    })
}

/// Trading days from the baseline until the close is back at or above it.
///
/// `post[0]` is the baseline close itself.
fn recovery_days(post: &[f64], base: f64) -> Option<u32> {
    let mut dipped = false;
    for (k, &close) in post.iter().enumerate().skip(1) {
        if close < base {
            dipped = true;
        } else if dipped {
            return Some(k as u32);
        }
    }
    if dipped {
        None
    } else {
        Some(0)
    }
}

/// Run the engine over every configured event and ticker.
///
/// Events are processed in config order, tickers in the given order. A failing
/// pair is logged and recorded as an omission; it never aborts the run.
pub fn run_metrics(
    events: &[TariffEvent],
    tickers: &[&str],
    loaded: &LoadedData,
    window: &WindowConfig,
) -> MetricsRun {
    let mut run = MetricsRun::default();

    for event in events {
        for &ticker in tickers {
            match compute_event_window(event, ticker, loaded.series(ticker), window) {
                Ok(w) => run.windows.push(w),
                Err(e) => {
                    tracing::warn!(
                        ticker,
                        event_date = %event.event_date,
                        error = %e,
                        "omitting event from output"
                    );
                    run.omissions.push(Omission {
                        event_date: event.event_date,
                        ticker: ticker.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    tracing::info!(
        windows = run.windows.len(),
        rows = run.metric_count(),
        omissions = run.omissions.len(),
        "metrics computed"
    );
    run
}
