//! Statistics helpers: pure functions over close-price slices.
//!
//! Nothing here knows about events, tickers or dates.

/// Day-over-day percent returns: `(p[i+1] - p[i]) / p[i] * 100`.
///
/// A non-positive previous price yields a 0.0 return for that step.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }
    closes
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0] * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Percent change of `value` relative to `base`.
///
/// Callers guarantee `base > 0`; the baseline lookup rejects anything else.
pub fn pct_change(value: f64, base: f64) -> f64 {
    (value - base) / base * 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). Returns 0.0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Relative Strength Index at `index` using simple averages over `period` changes.
///
/// Returns `None` when there are fewer than `period` changes up to `index`, or
/// when prices did not move at all over the period. No losses gives 100.
pub fn rsi(closes: &[f64], index: usize, period: usize) -> Option<f64> {
    if period == 0 || index >= closes.len() || index < period {
        return None;
    }
    let mut gain = 0.0;
    let mut loss = 0.0;
    for j in (index + 1 - period)..=index {
        let delta = closes[j] - closes[j - 1];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss -= delta;
        }
    }
    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { None } else { Some(100.0) };
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
