//! Run manifest (JSON): provenance for a set of exported files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tariffscope_core::data::DataSource;

use crate::config::WindowConfig;
use crate::runner::AnalysisResult;
use crate::window::Omission;

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub tickers: Vec<String>,
    pub window: WindowConfig,
    pub event_count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dataset_hash: String,
    pub sources: BTreeMap<String, DataSource>,
    pub has_synthetic: bool,
    pub record_count: usize,
    pub metric_rows: usize,
    pub omissions: Vec<Omission>,
}

impl RunManifest {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            tickers: result.config.tickers.clone(),
            window: result.config.window.clone(),
            event_count: result.config.events.len(),
            start_date: result.start_date,
            end_date: result.end_date,
            dataset_hash: result.dataset_hash.clone(),
            sources: result.sources.clone(),
            has_synthetic: result.has_synthetic,
            record_count: result.record_count,
            metric_rows: result.run.metric_count(),
            omissions: result.run.omissions.clone(),
        }
    }
}

pub fn write_manifest(path: &Path, result: &AnalysisResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&RunManifest::from_result(result))
        .context("failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write manifest to {}", path.display()))?;
    Ok(())
}

/// Load a manifest, rejecting schema versions newer than this build understands.
pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}
