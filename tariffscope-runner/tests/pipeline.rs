//! End-to-end tests: CSV price directory → metrics → exported files.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tariffscope_core::data::{CsvDirProvider, DataSource};
use tariffscope_core::domain::{PriceRecord, TariffEvent};
use tariffscope_runner::config::{AnalysisConfig, WindowConfig};
use tariffscope_runner::data_loader::LoadError;
use tariffscope_runner::export::read_metrics_csv;
use tariffscope_runner::manifest::read_manifest;
use tariffscope_runner::runner::{run_analysis, save_outputs, RunError, RunOptions};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Weekday closes between `start` and `end`, rounded to cents.
fn weekday_series(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord> {
    let mut out = Vec::new();
    let mut date = start;
    let mut i = 0usize;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let close = ((100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.02) * 100.0).round()
                / 100.0;
            out.push(PriceRecord {
                date,
                ticker: ticker.to_string(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000 + i as u64 * 1000,
            });
            i += 1;
        }
        date += Duration::days(1);
    }
    out
}

struct Fixture {
    _dir: TempDir,
    provider: CsvDirProvider,
    out_dir: std::path::PathBuf,
    spy: Vec<PriceRecord>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let provider = CsvDirProvider::new(dir.path().join("data"));
    let spy = weekday_series("SPY", d(2023, 12, 1), d(2024, 6, 28));
    provider.write("SPY", &spy).unwrap();
    let out_dir = dir.path().join("out");
    Fixture {
        _dir: dir,
        provider,
        out_dir,
        spy,
    }
}

fn config(events: Vec<TariffEvent>) -> AnalysisConfig {
    AnalysisConfig {
        tickers: vec!["SPY".into()],
        window: WindowConfig::symmetric(10),
        events,
    }
}

fn opts() -> RunOptions {
    RunOptions {
        synthetic: false,
        as_of: d(2024, 12, 31),
    }
}

fn standard_events() -> Vec<TariffEvent> {
    vec![
        TariffEvent::new(d(2024, 3, 6), "steel and aluminum tariffs"),
        // Saturday: baseline falls back to Friday's close.
        TariffEvent::new(d(2024, 3, 9), "weekend announcement"),
        // Past the end of the data: no baseline within lookback.
        TariffEvent::new(d(2030, 1, 2), "future event"),
    ]
}

#[test]
fn end_to_end_writes_all_outputs() {
    let fx = fixture();
    let result = run_analysis(&config(standard_events()), &fx.provider, &opts()).unwrap();

    assert_eq!(result.run.windows.len(), 2);
    assert_eq!(result.run.metric_count(), 2 * 21);
    assert_eq!(result.run.omissions.len(), 1);
    assert_eq!(result.run.omissions[0].event_date, d(2030, 1, 2));
    assert_eq!(result.sources.get("SPY"), Some(&DataSource::CsvFile));
    assert!(!result.has_synthetic);

    let weekend = &result.run.windows[1];
    assert_eq!(weekend.baseline.date, d(2024, 3, 8));
    assert!(weekend.baseline.substituted);

    let metrics_path = fx.out_dir.join("metrics.csv");
    let paths = save_outputs(&result, &metrics_path, true).unwrap();
    assert!(paths.metrics_csv.is_file());
    assert!(paths.summary_csv.is_file());
    assert!(paths.horizons_csv.is_file());
    assert!(paths.manifest.is_file());
    let report_path = paths.report.expect("report requested");
    let report = std::fs::read_to_string(report_path).unwrap();
    assert!(report.contains(&result.dataset_hash));
    assert!(report.contains("Omitted Pairs"));
}

#[test]
fn exported_rows_match_source_prices() {
    let fx = fixture();
    let result = run_analysis(&config(standard_events()), &fx.provider, &opts()).unwrap();
    let metrics_path = fx.out_dir.join("metrics.csv");
    save_outputs(&result, &metrics_path, false).unwrap();

    let rows = read_metrics_csv(&metrics_path).unwrap();
    assert_eq!(rows.len(), 42);

    for row in &rows {
        let window = result
            .run
            .windows
            .iter()
            .find(|w| w.event.event_date == row.event_date && w.ticker == row.ticker)
            .expect("row belongs to a computed window");
        let base_idx = fx
            .spy
            .iter()
            .position(|r| r.date == window.baseline.date)
            .unwrap();
        let base = fx.spy[base_idx].close;
        let close = fx.spy[(base_idx as i64 + row.offset_days as i64) as usize].close;
        let expected = if row.offset_days == 0 {
            0.0
        } else {
            (close - base) / base * 100.0
        };
        assert!(
            (row.pct_change_from_event - expected).abs() < 1e-4,
            "offset {}: {} vs {}",
            row.offset_days,
            row.pct_change_from_event,
            expected
        );
        assert_eq!(row.is_recovered, row.offset_days > 0 && close >= base);
    }

    let zero_rows: Vec<_> = rows.iter().filter(|r| r.offset_days == 0).collect();
    assert_eq!(zero_rows.len(), 2);
    assert!(zero_rows
        .iter()
        .all(|r| r.pct_change_from_event == 0.0 && !r.is_recovered));
}

#[test]
fn rows_are_ordered_by_event_then_offset() {
    let fx = fixture();
    let result = run_analysis(&config(standard_events()), &fx.provider, &opts()).unwrap();
    let rows: Vec<_> = result.run.metrics().collect();
    for pair in rows.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.event_date == b.event_date {
            assert_eq!(b.offset_days, a.offset_days + 1);
        } else {
            assert!(a.event_date < b.event_date);
        }
    }
}

#[test]
fn manifest_records_provenance() {
    let fx = fixture();
    let result = run_analysis(&config(standard_events()), &fx.provider, &opts()).unwrap();
    let paths = save_outputs(&result, &fx.out_dir.join("metrics.csv"), false).unwrap();
    assert!(paths.report.is_none());

    let manifest = read_manifest(&paths.manifest).unwrap();
    assert_eq!(manifest.dataset_hash, result.dataset_hash);
    assert_eq!(manifest.metric_rows, 42);
    assert_eq!(manifest.event_count, 3);
    assert_eq!(manifest.omissions.len(), 1);
    assert!(!manifest.has_synthetic);
}

#[test]
fn reruns_produce_identical_csv() {
    let fx = fixture();
    let cfg = config(standard_events());
    let a = fx.out_dir.join("a/metrics.csv");
    let b = fx.out_dir.join("b/metrics.csv");
    save_outputs(&run_analysis(&cfg, &fx.provider, &opts()).unwrap(), &a, false).unwrap();
    save_outputs(&run_analysis(&cfg, &fx.provider, &opts()).unwrap(), &b, false).unwrap();
    assert_eq!(
        std::fs::read(&a).unwrap(),
        std::fs::read(&b).unwrap()
    );
}

#[test]
fn missing_ticker_fails_the_run() {
    let fx = fixture();
    let mut cfg = config(standard_events());
    cfg.tickers.push("QQQ".into());
    let err = run_analysis(&cfg, &fx.provider, &opts()).unwrap_err();
    assert!(
        matches!(err, RunError::Load(LoadError::DataUnavailable { ref ticker, .. }) if ticker == "QQQ"),
        "got {err}"
    );
}

#[test]
fn empty_data_dir_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let provider = CsvDirProvider::new(dir.path());
    let mut cfg = config(standard_events());
    cfg.tickers = vec!["QQQ".into()];
    let err = run_analysis(&cfg, &provider, &opts()).unwrap_err();
    assert!(matches!(
        err,
        RunError::Load(LoadError::DataUnavailable { .. })
    ));
}

#[test]
fn synthetic_fallback_tags_the_run() {
    let fx = fixture();
    let mut cfg = config(standard_events());
    cfg.tickers.push("QQQ".into());
    let run_opts = RunOptions {
        synthetic: true,
        ..opts()
    };
    let result = run_analysis(&cfg, &fx.provider, &run_opts).unwrap();
    assert!(result.has_synthetic);
    assert_eq!(result.sources.get("QQQ"), Some(&DataSource::Synthetic));
    assert_eq!(result.sources.get("SPY"), Some(&DataSource::CsvFile));
    assert!(result.run.windows.iter().any(|w| w.ticker == "QQQ"));
}

#[test]
fn short_tail_is_reported_as_insufficient() {
    let fx = fixture();
    // 2024-06-21 is a Friday; the data ends five trading days later.
    let cfg = config(vec![TariffEvent::new(d(2024, 6, 21), "late event")]);
    let result = run_analysis(&cfg, &fx.provider, &opts()).unwrap();
    assert_eq!(result.run.metric_count(), 0);
    assert_eq!(result.run.omissions.len(), 1);
    assert!(result.run.omissions[0].reason.contains("insufficient"));
}

#[test]
fn invalid_config_is_rejected_before_loading() {
    let fx = fixture();
    let mut cfg = config(standard_events());
    cfg.tickers.clear();
    let err = run_analysis(&cfg, &fx.provider, &opts()).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}
