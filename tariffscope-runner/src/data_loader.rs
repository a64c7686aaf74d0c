//! Price loading for the pipeline.
//!
//! Given the configured tickers and a date range, fetches each ticker's
//! records from a provider, canonicalises them and returns them sorted
//! ascending by date. Fallback policy:
//! 1. Provider returns records → use them
//! 2. Provider fails or returns nothing and `synthetic` is set → generate a
//!    seeded random walk (tagged)
//! 3. Otherwise → fail: `DataUnavailable` when the provider has nothing for the
//!    ticker (no file, unknown symbol, empty range), `Fetch` for transport, I/O
//!    and parse failures
//!
//! Synthetic data is a developer-only mode; results built on it are tagged in
//! the manifest and report.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use tariffscope_core::data::{ingest, DataError, DataProvider, DataSource};
use tariffscope_core::domain::PriceRecord;
use thiserror::Error;

use crate::config::AnalysisConfig;

/// Calendar days of history loaded ahead of the window for indicator warmup.
const WARMUP_CALENDAR_DAYS: i64 = 30;

/// Calendar days after the last event needed for the horizon table (year end, six months).
const HORIZON_CALENDAR_DAYS: i64 = 366;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no price data for '{ticker}' between {start} and {end}")]
    DataUnavailable {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("failed to fetch '{ticker}' from {provider}: {source}")]
    Fetch {
        ticker: String,
        provider: String,
        source: DataError,
    },
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// First date requested (inclusive).
    pub start: NaiveDate,
    /// Last date requested (inclusive).
    pub end: NaiveDate,
    /// Generate synthetic records when real data is unavailable.
    pub synthetic: bool,
}

/// Loaded price series plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Records per ticker, ascending by date, one per trading day.
    pub series: BTreeMap<String, Vec<PriceRecord>>,
    /// Data source per ticker.
    pub sources: BTreeMap<String, DataSource>,
    /// BLAKE3 hash over every loaded record.
    pub dataset_hash: String,
    /// Whether any ticker used synthetic data.
    pub has_synthetic: bool,
}

impl LoadedData {
    pub fn series(&self, ticker: &str) -> &[PriceRecord] {
        self.series.get(ticker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// Date range that covers every event's window, baseline lookback and horizons.
///
/// Trading-day spans are converted to calendar days generously (7/5 plus a
/// holiday margin). The end is clamped to `as_of`.
pub fn analysis_span(config: &AnalysisConfig, as_of: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let (first, last) = config.event_range()?;
    let w = &config.window;

    let before_days = (w.before as i64 * 7).div_euclid(5) + 10;
    let after_days = (w.after as i64 * 7).div_euclid(5) + 10;

    let start = first
        - Duration::days(w.lookback_days as i64 + before_days + WARMUP_CALENDAR_DAYS);
    let end = (last + Duration::days(after_days.max(HORIZON_CALENDAR_DAYS))).min(as_of);
    Some((start, end))
}

/// Load records for each ticker from `provider`, with optional synthetic fallback.
pub fn load_prices(
    tickers: &[&str],
    provider: &dyn DataProvider,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let mut series = BTreeMap::new();
    let mut sources = BTreeMap::new();
    let mut has_synthetic = false;

    for (i, &ticker) in tickers.iter().enumerate() {
        tracing::info!(
            ticker,
            provider = provider.name(),
            "[{}/{}] loading {} to {}",
            i + 1,
            tickers.len(),
            opts.start,
            opts.end
        );

        let fetched = provider.fetch(ticker, opts.start, opts.end);
        let failure = match fetched {
            Ok(result) => {
                let report = ingest(result.records);
                if report.duplicates > 0 || report.rejected > 0 {
                    tracing::warn!(
                        ticker,
                        duplicates = report.duplicates,
                        rejected = report.rejected,
                        "cleaned price series"
                    );
                }
                if !report.records.is_empty() {
                    tracing::debug!(ticker, rows = report.records.len(), source = %result.source, "loaded");
                    series.insert(ticker.to_string(), report.records);
                    sources.insert(ticker.to_string(), result.source);
                    continue;
                }
                LoadError::DataUnavailable {
                    ticker: ticker.to_string(),
                    start: opts.start,
                    end: opts.end,
                }
            }
            Err(DataError::NoLocalData { .. } | DataError::SymbolNotFound { .. }) => {
                LoadError::DataUnavailable {
                    ticker: ticker.to_string(),
                    start: opts.start,
                    end: opts.end,
                }
            }
            Err(source) => LoadError::Fetch {
                ticker: ticker.to_string(),
                provider: provider.name().to_string(),
                source,
            },
        };

        if opts.synthetic {
            tracing::warn!(ticker, reason = %failure, "generating synthetic data; results will be tagged as synthetic");
            let records = generate_synthetic_records(ticker, opts.start, opts.end);
            series.insert(ticker.to_string(), records);
            sources.insert(ticker.to_string(), DataSource::Synthetic);
            has_synthetic = true;
            continue;
        }

        return Err(failure);
    }

    let dataset_hash = compute_dataset_hash(&series);

    Ok(LoadedData {
        series,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

/// Deterministic BLAKE3 hash over all records in ticker order.
fn compute_dataset_hash(series: &BTreeMap<String, Vec<PriceRecord>>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (ticker, records) in series {
        hasher.update(ticker.as_bytes());
        for r in records {
            hasher.update(r.date.to_string().as_bytes());
            hasher.update(&r.open.to_le_bytes());
            hasher.update(&r.high.to_le_bytes());
            hasher.update(&r.low.to_le_bytes());
            hasher.update(&r.close.to_le_bytes());
            hasher.update(&r.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Fixed-date U.S. market holidays (observed-date shifts are ignored).
fn is_fixed_holiday(date: NaiveDate) -> bool {
    matches!((date.month(), date.day()), (1, 1) | (7, 4) | (12, 25))
}

fn is_synthetic_trading_day(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() <= 5 && !is_fixed_holiday(date)
}

/// Seeded log-normal walk over weekdays in `[start, end]`, skipping fixed holidays.
///
/// The seed covers the ticker and the span, so a given request always yields
/// the same series. Starting level, drift and daily volatility are drawn per
/// ticker; volume rises with the size of the day's move.
fn generate_synthetic_records(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut hasher = blake3::Hasher::new();
    hasher.update(ticker.as_bytes());
    hasher.update(start.to_string().as_bytes());
    hasher.update(end.to_string().as_bytes());
    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());

    let mut level: f64 = rng.gen_range(50.0..250.0);
    let drift: f64 = rng.gen_range(-0.0002..0.0006);
    let sigma: f64 = rng.gen_range(0.008..0.02);
    let base_volume: f64 = rng.gen_range(1.0e6..5.0e7);

    start
        .iter_days()
        .take_while(|&date| date <= end)
        .filter(|&date| is_synthetic_trading_day(date))
        .map(|date| {
            // Irwin-Hall approximation of a standard normal draw.
            let z: f64 = (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0;
            let open = level;
            let close = open * (drift + sigma * z).exp();
            let wick = open.max(close) * sigma * rng.gen_range(0.0..0.5);
            let high = open.max(close) + wick;
            let low = (open.min(close) - wick).max(open.min(close) * 0.5);
            let volume = base_volume * (1.0 + z.abs()) * rng.gen_range(0.8..1.2);
            level = close;

            PriceRecord {
                date,
                ticker: ticker.to_string(),
                open,
                high,
                low,
                close,
                volume: volume.round() as u64,
            }
        })
        .collect()
}
