//! Calendar-horizon table: how far price, volume and RSI had moved one week,
//! one month, three months, six months and at year end after each event.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tariffscope_core::domain::{Baseline, PriceRecord};

use crate::stats::{pct_change, rsi};

/// RSI lookback in trading days.
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    EndOfYear,
}

impl Horizon {
    pub const ALL: [Horizon; 5] = [
        Horizon::OneWeek,
        Horizon::OneMonth,
        Horizon::ThreeMonths,
        Horizon::SixMonths,
        Horizon::EndOfYear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneWeek => "one_week_after",
            Horizon::OneMonth => "one_month_after",
            Horizon::ThreeMonths => "three_months_after",
            Horizon::SixMonths => "six_months_after",
            Horizon::EndOfYear => "end_of_year",
        }
    }

    /// Calendar date the horizon points at for an event on `event_date`.
    pub fn target_date(self, event_date: NaiveDate) -> NaiveDate {
        let days = match self {
            Horizon::OneWeek => 7,
            Horizon::OneMonth => 30,
            Horizon::ThreeMonths => 90,
            Horizon::SixMonths => 180,
            Horizon::EndOfYear => {
                return NaiveDate::from_ymd_opt(event_date.year(), 12, 31).unwrap_or(event_date)
            }
        };
        event_date + Duration::days(days)
    }
}

/// One horizon row. Value fields are `None` when the horizon lies past the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonMetric {
    pub event_date: NaiveDate,
    pub ticker: String,
    pub horizon: Horizon,
    pub target_date: NaiveDate,
    /// First trading day on or after `target_date`.
    pub observed_date: Option<NaiveDate>,
    pub price_change_pct: Option<f64>,
    pub volume_change_pct: Option<f64>,
    pub rsi: Option<f64>,
}

/// Horizon rows for one (event, ticker) pair, measured against `baseline`.
pub fn compute_horizons(
    ticker: &str,
    series: &[PriceRecord],
    baseline: &Baseline,
    event_date: NaiveDate,
) -> Vec<HorizonMetric> {
    let closes: Vec<f64> = series.iter().map(|r| r.close).collect();
    let base_volume = series.get(baseline.index).map_or(0, |r| r.volume);

    Horizon::ALL
        .iter()
        .map(|&horizon| {
            let target_date = horizon.target_date(event_date);
            let idx = series.partition_point(|r| r.date < target_date);
            let observed = series.get(idx);

            HorizonMetric {
                event_date,
                ticker: ticker.to_string(),
                horizon,
                target_date,
                observed_date: observed.map(|r| r.date),
                price_change_pct: observed.map(|r| pct_change(r.close, baseline.close)),
                volume_change_pct: observed
                    .filter(|_| base_volume > 0)
                    .map(|r| pct_change(r.volume as f64, base_volume as f64)),
                rsi: observed.and_then(|_| rsi(&closes, idx, RSI_PERIOD)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(start: NaiveDate, n: usize) -> Vec<PriceRecord> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                PriceRecord {
                    date: start + Duration::days(i as i64),
                    ticker: "SPY".into(),
                    open: c,
                    high: c + 1.0,
                    low: c - 1.0,
                    close: c,
                    volume: 1000 + i as u64 * 10,
                }
            })
            .collect()
    }

    #[test]
    fn target_dates() {
        let ev = d(2018, 3, 1);
        assert_eq!(Horizon::OneWeek.target_date(ev), d(2018, 3, 8));
        assert_eq!(Horizon::OneMonth.target_date(ev), d(2018, 3, 31));
        assert_eq!(Horizon::ThreeMonths.target_date(ev), d(2018, 5, 30));
        assert_eq!(Horizon::SixMonths.target_date(ev), d(2018, 8, 28));
        assert_eq!(Horizon::EndOfYear.target_date(ev), d(2018, 12, 31));
    }

    #[test]
    fn horizons_measure_against_baseline() {
        let s = daily(d(2018, 2, 1), 60);
        let base_idx = 28; // 2018-03-01
        let baseline = Baseline {
            date: s[base_idx].date,
            close: s[base_idx].close,
            index: base_idx,
            substituted: false,
        };
        let rows = compute_horizons("SPY", &s, &baseline, d(2018, 3, 1));
        assert_eq!(rows.len(), 5);

        let week = &rows[0];
        assert_eq!(week.horizon, Horizon::OneWeek);
        assert_eq!(week.observed_date, Some(d(2018, 3, 8)));
        let expected = (135.0 - 128.0) / 128.0 * 100.0;
        assert!((week.price_change_pct.unwrap() - expected).abs() < 1e-10);
        let vol_expected = (1350.0 - 1280.0) / 1280.0 * 100.0;
        assert!((week.volume_change_pct.unwrap() - vol_expected).abs() < 1e-10);
        // strictly rising closes
        assert_eq!(week.rsi, Some(100.0));

        // data ends 2018-04-01: three months out is past the data
        let three = &rows[2];
        assert_eq!(three.observed_date, None);
        assert_eq!(three.price_change_pct, None);
        assert_eq!(three.rsi, None);
    }

    #[test]
    fn zero_baseline_volume_leaves_volume_change_empty() {
        let mut s = daily(d(2018, 2, 1), 40);
        s[28].volume = 0;
        let baseline = Baseline {
            date: s[28].date,
            close: s[28].close,
            index: 28,
            substituted: false,
        };
        let rows = compute_horizons("SPY", &s, &baseline, d(2018, 3, 1));
        assert!(rows[0].price_change_pct.is_some());
        assert_eq!(rows[0].volume_change_pct, None);
    }
}
