//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over where daily prices come from (a
//! directory of CSV files, Stooq over HTTP) so the loader can swap sources
//! and tests can supply in-memory fakes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::PriceRecord;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {provider} for '{symbol}'")]
    HttpStatus {
        provider: String,
        symbol: String,
        status: u16,
    },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no local price file for '{symbol}' at {}", path.display())]
    NoLocalData { symbol: String, path: PathBuf },

    #[error("malformed price data for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub records: Vec<PriceRecord>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    CsvFile,
    Stooq,
    Synthetic,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataSource::CsvFile => "csv_file",
            DataSource::Stooq => "stooq",
            DataSource::Synthetic => "synthetic",
        };
        f.write_str(s)
    }
}

/// Trait for daily price providers.
///
/// `fetch` returns every record the source holds inside `[start, end]`
/// (inclusive). An empty result is not an error here; the loader decides
/// what an empty series means.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV records for a symbol over a date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

/// Keep only records whose date lies in `[start, end]`.
pub(crate) fn retain_range(records: &mut Vec<PriceRecord>, start: NaiveDate, end: NaiveDate) {
    records.retain(|r| r.date >= start && r.date <= end);
}
