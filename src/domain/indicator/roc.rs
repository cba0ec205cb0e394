//! Rate of Change.
//!
//! ROC[i] = (C[i] - C[i-n]) / C[i-n] * 100.
//! Warmup: first n values are undefined. Also undefined wherever the
//! reference price is zero or not finite.

use super::Series;

pub fn calculate_roc(prices: &[f64], period: usize) -> Series {
    prices
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if period == 0 || i < period {
                return None;
            }
            let previous = prices[i - period];
            if previous == 0.0 || !previous.is_finite() {
                return None;
            }
            Some((current - previous) / previous * 100.0)
        })
        .collect()
}
