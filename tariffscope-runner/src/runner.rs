//! Pipeline runner: wires together config, loading, metrics and export.
//!
//! Two entry points:
//! - `run_analysis()`: loads prices from a provider and computes every event window.
//! - `save_outputs()`: writes the metrics CSV and its companion artifacts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use tariffscope_core::data::{DataProvider, DataSource};
use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::{analysis_span, load_prices, LoadError, LoadOptions};
use crate::export::{write_horizons_csv, write_metrics_csv, write_summary_csv};
use crate::manifest::write_manifest;
use crate::report::generate_report;
use crate::window::{run_metrics, MetricsRun};

/// Errors that stop a run before any output is written.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
}

/// Options for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Generate synthetic prices for tickers the provider cannot supply.
    pub synthetic: bool,
    /// Latest date data may be requested for.
    pub as_of: NaiveDate,
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub config: AnalysisConfig,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dataset_hash: String,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
    pub record_count: usize,
    pub run: MetricsRun,
}

/// Paths written by `save_outputs`.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub metrics_csv: PathBuf,
    pub summary_csv: PathBuf,
    pub horizons_csv: PathBuf,
    pub manifest: PathBuf,
    pub report: Option<PathBuf>,
}

/// Load prices for the configured tickers and compute all event windows.
///
/// A ticker the provider cannot supply fails the run. Per-event failures do
/// not: they are collected in `run.omissions`.
pub fn run_analysis(
    config: &AnalysisConfig,
    provider: &dyn DataProvider,
    opts: &RunOptions,
) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let (start, end) = analysis_span(config, opts.as_of)
        .ok_or_else(|| ConfigError::Invalid("at least one event is required".into()))?;

    tracing::info!(
        tickers = config.tickers.len(),
        events = config.events.len(),
        %start,
        %end,
        "starting analysis"
    );

    let tickers: Vec<&str> = config.tickers.iter().map(String::as_str).collect();
    let loaded = load_prices(
        &tickers,
        provider,
        &LoadOptions {
            start,
            end,
            synthetic: opts.synthetic,
        },
    )?;

    let run = run_metrics(&config.events, &tickers, &loaded, &config.window);

    Ok(AnalysisResult {
        config: config.clone(),
        start_date: start,
        end_date: end,
        record_count: loaded.record_count(),
        dataset_hash: loaded.dataset_hash,
        sources: loaded.sources,
        has_synthetic: loaded.has_synthetic,
        run,
    })
}

/// Write the metrics CSV at `metrics_path` and its companions beside it:
/// `event_summary.csv`, `horizons.csv`, `manifest.json` and, when requested,
/// `report.md`.
pub fn save_outputs(
    result: &AnalysisResult,
    metrics_path: &Path,
    with_report: bool,
) -> anyhow::Result<OutputPaths> {
    let dir = metrics_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let rows = write_metrics_csv(metrics_path, result.run.metrics())?;
    tracing::info!(rows, path = %metrics_path.display(), "wrote metrics");

    let summary_csv = dir.join("event_summary.csv");
    write_summary_csv(&summary_csv, result.run.summaries())?;

    let horizons_csv = dir.join("horizons.csv");
    write_horizons_csv(&horizons_csv, result.run.horizons())?;

    let manifest = dir.join("manifest.json");
    write_manifest(&manifest, result)?;

    let report = if with_report {
        let path = dir.join("report.md");
        std::fs::write(&path, generate_report(result))
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(OutputPaths {
        metrics_csv: metrics_path.to_path_buf(),
        summary_csv,
        horizons_csv,
        manifest,
        report,
    })
}
