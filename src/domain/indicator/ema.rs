//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the SMA of the first n prices, then
//! EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1].
//! Warmup: first (n-1) values are undefined.

use super::Series;

pub fn calculate_ema(prices: &[f64], period: usize) -> Series {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(ema);

    for (i, &price) in prices.iter().enumerate().skip(period) {
        ema = (price - ema) * k + ema;
        values[i] = Some(ema);
    }

    values
}
