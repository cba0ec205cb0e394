//! Rolling population standard deviation.
//!
//! Warmup: first (n-1) values are undefined.

use super::Series;

pub fn calculate_stddev(prices: &[f64], period: usize) -> Series {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let n = period as f64;
    for i in (period - 1)..prices.len() {
        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        values[i] = Some(variance.sqrt());
    }

    values
}
