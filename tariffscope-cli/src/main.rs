//! Tariffscope CLI: event-window analysis of tariff announcements.
//!
//! Commands:
//! - `analyze`: load prices, compute event windows, write CSVs and report
//! - `fetch`: download the configured tickers from Stooq into the CSV directory
//! - `events`: list the configured tariff events
//! - `init-config`: write the built-in configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tariffscope_core::data::{ingest, CsvDirProvider, DataProvider, StooqProvider};
use tariffscope_runner::runner::{run_analysis, save_outputs, AnalysisResult, RunOptions};
use tariffscope_runner::{analysis_span, AnalysisConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "tariffscope",
    about = "Tariffscope: how stock prices react around tariff announcements"
)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute event-window metrics and write the CSV outputs.
    Analyze {
        /// Path to a TOML config file. Defaults to the built-in event list.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of per-ticker price CSV files.
        #[arg(long, env = "TARIFFSCOPE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Metrics CSV path. Companion files are written beside it.
        #[arg(
            long,
            env = "TARIFFSCOPE_OUTPUT",
            default_value = "output/tariff_event_metrics.csv"
        )]
        output: PathBuf,

        /// Download prices from Stooq instead of reading the CSV directory.
        #[arg(long, default_value_t = false)]
        stooq: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Skip the Markdown report.
        #[arg(long, default_value_t = false)]
        no_report: bool,
    },
    /// Download the configured tickers from Stooq into the CSV directory.
    Fetch {
        /// Path to a TOML config file. Defaults to the built-in event list.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of per-ticker price CSV files.
        #[arg(long, env = "TARIFFSCOPE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Start date (YYYY-MM-DD). Defaults to the span the events need.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to the span the events need.
        #[arg(long)]
        end: Option<String>,
    },
    /// List the configured tariff events.
    Events {
        /// Path to a TOML config file. Defaults to the built-in event list.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "tariffscope.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            config,
            data_dir,
            output,
            stooq,
            synthetic,
            no_report,
        } => run_analyze_cmd(config, data_dir, output, stooq, synthetic, !no_report),
        Commands::Fetch {
            config,
            data_dir,
            start,
            end,
        } => run_fetch(config, data_dir, start, end),
        Commands::Events { config } => run_events(config),
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::builtin()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_analyze_cmd(
    config_path: Option<PathBuf>,
    data_dir: PathBuf,
    output: PathBuf,
    stooq: bool,
    synthetic: bool,
    with_report: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let opts = RunOptions {
        synthetic,
        as_of: today(),
    };

    let csv_provider;
    let stooq_provider;
    let provider: &dyn DataProvider = if stooq {
        stooq_provider = StooqProvider::new()?;
        &stooq_provider
    } else {
        csv_provider = CsvDirProvider::new(&data_dir);
        &csv_provider
    };

    let result = run_analysis(&config, provider, &opts)?;
    print_summary(&result);

    let paths = save_outputs(&result, &output, with_report)?;
    println!("Metrics written to: {}", paths.metrics_csv.display());
    println!("Summary written to: {}", paths.summary_csv.display());
    println!("Horizons written to: {}", paths.horizons_csv.display());
    if let Some(report) = &paths.report {
        println!("Report written to: {}", report.display());
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    println!();
    println!("=== Tariff Event Analysis ===");
    println!("Tickers:      {}", result.config.tickers.join(", "));
    println!("Events:       {}", result.config.events.len());
    println!("Data span:    {} to {}", result.start_date, result.end_date);
    println!("Dataset hash: {}", result.dataset_hash);
    if result.has_synthetic {
        println!("WARNING: synthetic data used; figures are not real market data");
    }
    println!();
    println!(
        "{:<12} {:<8} {:>10} {:>10} {:>10}  Recovery",
        "Event", "Ticker", "Baseline", "MaxDD", "Vol"
    );
    for s in result.run.summaries() {
        let recovery = s
            .recovery_days
            .map(|d| format!("{d} days"))
            .unwrap_or_else(|| "not recovered".into());
        println!(
            "{:<12} {:<8} {:>10.2} {:>9.2}% {:>9.2}%  {}",
            s.event_date.to_string(),
            s.ticker,
            s.baseline_close,
            s.max_drawdown_pct,
            s.window_volatility_pct,
            recovery
        );
    }

    if !result.run.omissions.is_empty() {
        println!();
        println!("Omitted ({}):", result.run.omissions.len());
        for o in &result.run.omissions {
            println!("  {} {}: {}", o.event_date, o.ticker, o.reason);
        }
    }
    println!();
    println!("Rows: {}", result.run.metric_count());
}

fn run_fetch(
    config_path: Option<PathBuf>,
    data_dir: PathBuf,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let (default_start, default_end) = analysis_span(&config, today())
        .context("config has no events to derive a date range from")?;
    let start_date = start.as_deref().map(parse_date).transpose()?.unwrap_or(default_start);
    let end_date = end.as_deref().map(parse_date).transpose()?.unwrap_or(default_end);
    if start_date > end_date {
        bail!("start date {start_date} is after end date {end_date}");
    }

    let provider = StooqProvider::new()?;
    let store = CsvDirProvider::new(&data_dir);
    let mut errors = Vec::new();

    for ticker in &config.tickers {
        let fetched = provider
            .fetch(ticker, start_date, end_date)
            .map_err(anyhow::Error::from)
            .and_then(|result| {
                let report = ingest(result.records);
                let path = store.write(ticker, &report.records)?;
                Ok((report.records.len(), path))
            });
        match fetched {
            Ok((rows, path)) => println!("{ticker}: {rows} rows -> {}", path.display()),
            Err(e) => errors.push((ticker.clone(), e)),
        }
    }

    if !errors.is_empty() {
        for (ticker, err) in &errors {
            eprintln!("Error for {ticker}: {err:#}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_events(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    println!("{} events:", config.events.len());
    for ev in &config.events {
        let country = ev.country.as_deref().unwrap_or("-");
        println!("  {}  [{}] {}", ev.event_date, country, ev.description);
        if !ev.source_note.is_empty() {
            println!("              {}", ev.source_note);
        }
    }
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let toml = AnalysisConfig::builtin().to_toml()?;
    std::fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Config written to: {}", path.display());
    Ok(())
}
