//! Markdown report generator.

use crate::horizons::Horizon;
use crate::runner::AnalysisResult;

fn fmt_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.2}%")).unwrap_or_else(|| "n/a".into())
}

pub fn generate_report(result: &AnalysisResult) -> String {
    let cfg = &result.config;
    let mut report = format!(
        "# Tariff Event Impact Report\n\n\
Tickers: {}\n\n\
## Run\n\
- Events: {}\n\
- Window: {} trading days before / {} after (baseline lookback {} days)\n\
- Data span: {} to {}\n\
- Price records: {}\n\
- Metric rows: {}\n\
- Dataset hash: `{}`\n",
        cfg.tickers.join(", "),
        cfg.events.len(),
        cfg.window.before,
        cfg.window.after,
        cfg.window.lookback_days,
        result.start_date,
        result.end_date,
        result.record_count,
        result.run.metric_count(),
        result.dataset_hash,
    );

    report.push_str("\n| Ticker | Source |\n");
    report.push_str("|--------|--------|\n");
    for (ticker, source) in &result.sources {
        report.push_str(&format!("| {} | {} |\n", ticker, source));
    }

    if result.has_synthetic {
        report.push_str(
            "\n> **Synthetic data**: at least one series is a generated random walk. \
Figures for it do not describe real market behaviour.\n",
        );
    }

    if !result.run.windows.is_empty() {
        report.push_str("\n## Event Summary\n\n");
        report.push_str(
            "| Event | Ticker | Baseline | Close | Max Drawdown | Recovery (days) | Volatility | Description |\n",
        );
        report.push_str(
            "|-------|--------|----------|-------|--------------|-----------------|------------|-------------|\n",
        );
        for s in result.run.summaries() {
            let baseline = if s.baseline_substituted {
                format!("{}*", s.baseline_date)
            } else {
                s.baseline_date.to_string()
            };
            let recovery = s
                .recovery_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "not recovered".into());
            report.push_str(&format!(
                "| {} | {} | {} | {:.2} | {:+.2}% | {} | {:.2}% | {} |\n",
                s.event_date,
                s.ticker,
                baseline,
                s.baseline_close,
                s.max_drawdown_pct,
                recovery,
                s.window_volatility_pct,
                s.description,
            ));
        }
        if result.run.summaries().any(|s| s.baseline_substituted) {
            report.push_str("\n\\* event date was not a trading day; prior close used.\n");
        }

        report.push_str("\n## Calendar Horizons\n\n");
        report.push_str("| Event | Ticker |");
        for h in Horizon::ALL {
            report.push_str(&format!(" {} |", h.label()));
        }
        report.push('\n');
        report.push_str("|-------|--------|");
        for _ in Horizon::ALL {
            report.push_str("------|");
        }
        report.push('\n');
        for w in &result.run.windows {
            report.push_str(&format!("| {} | {} |", w.event.event_date, w.ticker));
            for h in Horizon::ALL {
                let value = w
                    .horizons
                    .iter()
                    .find(|m| m.horizon == h)
                    .and_then(|m| m.price_change_pct);
                report.push_str(&format!(" {} |", fmt_pct(value)));
            }
            report.push('\n');
        }
    }

    if !result.run.omissions.is_empty() {
        report.push_str("\n## Omitted Pairs\n\n");
        report.push_str("| Event | Ticker | Reason |\n");
        report.push_str("|-------|--------|--------|\n");
        for o in &result.run.omissions {
            report.push_str(&format!("| {} | {} | {} |\n", o.event_date, o.ticker, o.reason));
        }
    }

    report.push_str(
        "\n## Notes\n\
- Offsets are trading days relative to the baseline close on or before each event date.\n\
- Percent changes are measured against the baseline close.\n\
- Volatility is the sample standard deviation of daily percent returns.\n",
    );

    report
}
