//! Stooq data provider.
//!
//! Downloads daily OHLCV history as CSV from Stooq's public download endpoint.
//! One request per symbol, no retries: a failed download is reported to the
//! caller and the run stops there.

use chrono::NaiveDate;
use std::time::Duration;

use super::csv_dir::read_price_csv;
use super::provider::{retain_range, DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceRecord;

const DEFAULT_BASE_URL: &str = "https://stooq.com/q/d/l/";

/// Stooq daily-history provider.
pub struct StooqProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl StooqProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("tariffscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different endpoint (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Map a ticker to Stooq's symbol convention.
    ///
    /// Plain US tickers get the `.us` market suffix; index symbols (`^spx`)
    /// and symbols that already carry a suffix pass through. Stooq symbols are
    /// lowercase.
    pub fn stooq_symbol(ticker: &str) -> String {
        let lower = ticker.trim().to_ascii_lowercase();
        if lower.starts_with('^') || lower.contains('.') {
            lower
        } else {
            format!("{lower}.us")
        }
    }

    fn download_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?s={}&d1={}&d2={}&i=d",
            self.base_url,
            Self::stooq_symbol(ticker),
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        )
    }
}

/// Parse a Stooq download body into records inside `[start, end]`.
///
/// Unknown symbols come back as 200 with a plain-text "No data" body.
fn parse_body(
    symbol: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceRecord>, DataError> {
    if body.trim().is_empty() || body.trim_start().starts_with("No data") {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    let mut records = read_price_csv(symbol, body.as_bytes())?;
    retain_range(&mut records, start, end);
    Ok(records)
}

impl DataProvider for StooqProvider {
    fn name(&self) -> &str {
        "stooq"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = self.download_url(symbol, start, end);
        tracing::info!(symbol, %url, "downloading from stooq");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                provider: self.name().to_string(),
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        Ok(FetchResult {
            symbol: symbol.to_string(),
            records: parse_body(symbol, &body, start, end)?,
            source: DataSource::Stooq,
        })
    }
}
