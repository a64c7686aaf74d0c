//! Property tests for the event-window engine.
//!
//! Uses proptest to verify:
//! 1. Baseline selection: latest record on or before the event, within lookback
//! 2. Offset zero is always 0.0 and never recovered
//! 3. Recovery is decided per offset against the baseline close
//! 4. Full windows emit exactly before + after + 1 contiguous rows

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use tariffscope_core::domain::{PriceRecord, TariffEvent};
use tariffscope_runner::config::WindowConfig;
use tariffscope_runner::window::{compute_event_window, find_baseline, MetricsError};

// ── Strategies (proptest) ────────────────────────────────────────────

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Strictly increasing dates (gaps of 1..=4 days) with positive closes.
fn arb_series(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<PriceRecord>> {
    prop::collection::vec((1..=4i64, 10.0..500.0_f64), len).prop_map(|steps| {
        let mut date = origin();
        steps
            .into_iter()
            .map(|(gap, close)| {
                date += Duration::days(gap);
                let close = (close * 100.0).round() / 100.0;
                PriceRecord {
                    date,
                    ticker: "SPY".into(),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    })
}

// ── 1. Baseline selection ────────────────────────────────────────────

proptest! {
    #[test]
    fn baseline_is_latest_record_not_after_event(
        series in arb_series(1..60),
        event_offset in 0i64..260,
        lookback in 0u32..10,
    ) {
        let event_date = origin() + Duration::days(event_offset);
        let expected = series.iter().rev().find(|r| r.date <= event_date);

        match find_baseline("SPY", &series, event_date, lookback) {
            Ok(b) => {
                let rec = expected.expect("baseline found without a candidate");
                prop_assert_eq!(b.date, rec.date);
                prop_assert_eq!(b.close, rec.close);
                prop_assert_eq!(series[b.index].date, b.date);
                prop_assert_eq!(b.substituted, b.date != event_date);
                prop_assert!(event_date - b.date <= Duration::days(lookback as i64));
            }
            Err(MetricsError::BaselineMissing { .. }) => {
                if let Some(rec) = expected {
                    prop_assert!(event_date - rec.date > Duration::days(lookback as i64));
                }
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}

// ── 2-4. Window rows ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn window_rows_are_consistent(
        series in arb_series(30..80),
        pick in 0usize..1000,
        before in 1u32..8,
        after in 1u32..8,
    ) {
        let window = WindowConfig { before, after, ..WindowConfig::default() };
        let lo = before as usize;
        let hi = series.len() - 1 - after as usize;
        let idx = lo + pick % (hi - lo + 1);
        let event = TariffEvent::new(series[idx].date, "prop event");

        let w = compute_event_window(&event, "SPY", &series, &window).unwrap();
        prop_assert_eq!(w.baseline.index, idx);
        prop_assert_eq!(w.metrics.len(), (before + after + 1) as usize);

        let base = series[idx].close;
        for (k, m) in w.metrics.iter().enumerate() {
            prop_assert_eq!(m.offset_days, k as i32 - before as i32);
            let close = series[(idx as i64 + m.offset_days as i64) as usize].close;
            if m.offset_days == 0 {
                prop_assert_eq!(m.pct_change_from_event, 0.0);
                prop_assert!(!m.is_recovered);
                prop_assert_eq!(m.volatility_window, 0.0);
            } else {
                let expected = (close - base) / base * 100.0;
                prop_assert!((m.pct_change_from_event - expected).abs() < 1e-9);
            }
            prop_assert_eq!(m.is_recovered, m.offset_days > 0 && close >= base);
            prop_assert!(m.volatility_window >= 0.0);
        }

        prop_assert!(w.summary.max_drawdown_pct <= 0.0);
        if let Some(days) = w.summary.recovery_days {
            prop_assert!(days <= after);
        }
    }
}
