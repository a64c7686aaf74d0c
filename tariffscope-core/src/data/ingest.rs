//! Record ingestion: canonical ordering, de-duplication, sanity filtering.

use crate::domain::PriceRecord;

/// Outcome of ingesting one ticker's raw records.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records sorted ascending by date, one per date, all sane.
    pub records: Vec<PriceRecord>,
    /// Records removed because a record for the same date came first.
    pub duplicates: usize,
    /// Records removed by the OHLC sanity check.
    pub rejected: usize,
}

/// Sort by date (stable), keep the first record per date, drop insane rows.
pub fn ingest(mut raw: Vec<PriceRecord>) -> IngestReport {
    raw.sort_by_key(|r| r.date);

    let mut report = IngestReport {
        records: Vec::with_capacity(raw.len()),
        ..Default::default()
    };

    for rec in raw {
        if report.records.last().is_some_and(|prev| prev.date == rec.date) {
            report.duplicates += 1;
            continue;
        }
        if !rec.is_sane() {
            tracing::warn!(ticker = %rec.ticker, date = %rec.date, "dropping record that fails OHLC sanity check");
            report.rejected += 1;
            continue;
        }
        report.records.push(rec);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(day: u32, close: f64) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::from_ymd_opt(2018, 9, day).unwrap(),
            ticker: "SPY".into(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn sorts_ascending() {
        let out = ingest(vec![rec(19, 3.0), rec(17, 1.0), rec(18, 2.0)]);
        let days: Vec<u32> = out.records.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(days, vec![17, 18, 19]);
    }

    #[test]
    fn keeps_first_duplicate() {
        let out = ingest(vec![rec(17, 10.0), rec(17, 20.0), rec(18, 11.0)]);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].close, 10.0);
        assert_eq!(out.duplicates, 1);
    }

    #[test]
    fn drops_insane_records() {
        let mut bad = rec(18, 50.0);
        bad.high = 10.0;
        let out = ingest(vec![rec(17, 50.0), bad]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected, 1);
    }

    #[test]
    fn empty_input_is_empty_report() {
        let out = ingest(Vec::new());
        assert!(out.records.is_empty());
        assert_eq!(out.duplicates + out.rejected, 0);
    }
}
