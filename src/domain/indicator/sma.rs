//! Simple Moving Average.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) values are undefined.

use super::Series;

pub fn calculate_sma(prices: &[f64], period: usize) -> Series {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    for i in (period - 1)..prices.len() {
        let sum: f64 = prices[i + 1 - period..=i].iter().sum();
        values[i] = Some(sum / period as f64);
    }

    values
}
