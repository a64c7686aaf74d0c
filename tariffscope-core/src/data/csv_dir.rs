//! CSV price files: one `<TICKER>.csv` per symbol in a data directory.
//!
//! The column layout is `date,open,high,low,close,volume`. Stooq's download
//! format (`Date,Open,High,Low,Close,Volume`) reads without conversion, and a
//! missing volume column (common for indices) reads as zero.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::provider::{retain_range, DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceRecord;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

/// Parse a price CSV into records for `ticker`, in file order.
pub fn read_price_csv<R: Read>(ticker: &str, reader: R) -> Result<Vec<PriceRecord>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::Malformed {
            symbol: ticker.to_string(),
            reason: format!("row {}: {e}", line + 1),
        })?;
        records.push(PriceRecord {
            date: row.date,
            ticker: ticker.to_string(),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.map(|v| v.max(0.0).round() as u64).unwrap_or(0),
        });
    }
    Ok(records)
}

/// Write records in the canonical column layout.
pub fn write_price_csv<W: Write>(writer: W, records: &[PriceRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for r in records {
        wtr.write_record([
            r.date.to_string(),
            format!("{:.6}", r.open),
            format!("{:.6}", r.high),
            format!("{:.6}", r.low),
            format!("{:.6}", r.close),
            r.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Provider backed by a directory of per-ticker CSV files.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path holding `ticker`'s prices.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    pub fn has(&self, ticker: &str) -> bool {
        self.path_for(ticker).is_file()
    }

    /// Write (or overwrite) the CSV file for `ticker`.
    pub fn write(&self, ticker: &str, records: &[PriceRecord]) -> Result<PathBuf, DataError> {
        let path = self.path_for(ticker);
        let io_err = |reason: String| DataError::Io {
            path: path.clone(),
            reason,
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(e.to_string()))?;
        let file = File::create(&path).map_err(|e| io_err(e.to_string()))?;
        write_price_csv(file, records).map_err(|e| io_err(e.to_string()))?;
        Ok(path)
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::NoLocalData {
                symbol: symbol.to_string(),
                path,
            });
        }
        let file = File::open(&path).map_err(|e| DataError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let mut records = read_price_csv(symbol, file)?;
        retain_range(&mut records, start, end);
        tracing::debug!(symbol, path = %path.display(), rows = records.len(), "read price file");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            records,
            source: DataSource::CsvFile,
        })
    }
}
