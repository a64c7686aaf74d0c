//! Tariffscope Runner: event-window analysis of tariff announcements.
//!
//! This crate builds on `tariffscope-core` to provide:
//! - Analysis config (TOML) with a built-in event list
//! - Price loading with synthetic fallback and dataset hashing
//! - Trading-day event windows, summaries and calendar horizons
//! - CSV export, Markdown report and run manifest

pub mod config;
pub mod data_loader;
pub mod export;
pub mod horizons;
pub mod manifest;
pub mod report;
pub mod runner;
pub mod stats;
pub mod window;

pub use config::{builtin_events, AnalysisConfig, ConfigError, WindowConfig};
pub use data_loader::{analysis_span, load_prices, LoadError, LoadOptions, LoadedData};
pub use export::{read_metrics_csv, write_metrics_csv, METRICS_HEADER};
pub use horizons::{compute_horizons, Horizon, HorizonMetric};
pub use manifest::{read_manifest, RunManifest};
pub use report::generate_report;
pub use runner::{run_analysis, save_outputs, AnalysisResult, OutputPaths, RunError, RunOptions};
pub use window::{
    compute_event_window, find_baseline, run_metrics, EventSummary, EventWindow, MetricsError,
    MetricsRun, Omission,
};
