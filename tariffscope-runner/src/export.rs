//! CSV export: the metrics file plus the event-summary and horizon tables.
//!
//! The metrics file has a fixed header and four-decimal floats:
//! `event_date,ticker,offset_days,pct_change_from_event,is_recovered,volatility_window`.
//! Every writer overwrites its target and flushes before returning.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tariffscope_core::domain::EventWindowMetric;

use crate::horizons::HorizonMetric;
use crate::window::EventSummary;

/// Column header of the metrics CSV.
pub const METRICS_HEADER: [&str; 6] = [
    "event_date",
    "ticker",
    "offset_days",
    "pct_change_from_event",
    "is_recovered",
    "volatility_window",
];

/// Decimal places for every float column.
pub const CSV_DECIMALS: usize = 4;

/// Format a float with `CSV_DECIMALS` places; negative zero prints as zero.
pub fn format_decimal(value: f64) -> String {
    let s = format!("{:.*}", CSV_DECIMALS, value);
    if s.starts_with('-') && s[1..].bytes().all(|b| b == b'0' || b == b'.') {
        s[1..].to_string()
    } else {
        s
    }
}

fn format_opt(value: Option<f64>) -> String {
    value.map(format_decimal).unwrap_or_default()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

fn create_csv(path: &Path) -> Result<csv::Writer<File>> {
    ensure_parent(path)?;
    csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write metric rows as CSV to any writer.
pub fn write_metrics<W: std::io::Write>(writer: W, metrics: &[&EventWindowMetric]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(METRICS_HEADER)?;
    for m in metrics {
        wtr.write_record([
            m.event_date.to_string(),
            m.ticker.clone(),
            m.offset_days.to_string(),
            format_decimal(m.pct_change_from_event),
            m.is_recovered.to_string(),
            format_decimal(m.volatility_window),
        ])?;
    }
    wtr.flush().context("failed to flush metrics CSV")?;
    Ok(())
}

/// Write (or overwrite) the metrics CSV at `path`.
pub fn write_metrics_csv<'a>(
    path: &Path,
    metrics: impl IntoIterator<Item = &'a EventWindowMetric>,
) -> Result<usize> {
    let rows: Vec<&EventWindowMetric> = metrics.into_iter().collect();
    ensure_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_metrics(file, &rows).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(rows.len())
}

/// Read a metrics CSV written by `write_metrics_csv`.
pub fn read_metrics_csv(path: &Path) -> Result<Vec<EventWindowMetric>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("failed to open {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(METRICS_HEADER.iter().copied()) {
        anyhow::bail!(
            "unexpected header in {}: {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        );
    }

    rdr.deserialize()
        .collect::<std::result::Result<Vec<EventWindowMetric>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Write the per-event summary table.
pub fn write_summary_csv<'a>(
    path: &Path,
    summaries: impl IntoIterator<Item = &'a EventSummary>,
) -> Result<()> {
    let mut wtr = create_csv(path)?;
    wtr.write_record([
        "event_date",
        "ticker",
        "description",
        "baseline_date",
        "baseline_close",
        "baseline_substituted",
        "max_drawdown_pct",
        "recovery_days",
        "window_volatility_pct",
    ])?;
    for s in summaries {
        wtr.write_record([
            s.event_date.to_string(),
            s.ticker.clone(),
            s.description.clone(),
            s.baseline_date.to_string(),
            format_decimal(s.baseline_close),
            s.baseline_substituted.to_string(),
            format_decimal(s.max_drawdown_pct),
            s.recovery_days.map(|d| d.to_string()).unwrap_or_default(),
            format_decimal(s.window_volatility_pct),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Write the calendar-horizon table. Horizons past the data leave empty cells.
pub fn write_horizons_csv<'a>(
    path: &Path,
    horizons: impl IntoIterator<Item = &'a HorizonMetric>,
) -> Result<()> {
    let mut wtr = create_csv(path)?;
    wtr.write_record([
        "event_date",
        "ticker",
        "horizon",
        "target_date",
        "observed_date",
        "price_change_pct",
        "volume_change_pct",
        "rsi",
    ])?;
    for h in horizons {
        wtr.write_record([
            h.event_date.to_string(),
            h.ticker.clone(),
            h.horizon.label().to_string(),
            h.target_date.to_string(),
            h.observed_date.map(|d| d.to_string()).unwrap_or_default(),
            format_opt(h.price_change_pct),
            format_opt(h.volume_change_pct),
            format_opt(h.rsi),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
