//! Bollinger Bands.
//!
//! Middle = SMA(n), Upper/Lower = Middle +/- multiplier * population stddev.
//! Warmup: first (n-1) values are undefined.

use super::{calculate_sma, calculate_stddev, Series};

/// The three band series, each aligned with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn calculate_bollinger(prices: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = calculate_sma(prices, period);
    let stddev = calculate_stddev(prices, period);

    let band = |sign: f64| -> Series {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, sd)| Some(m.as_ref()? + sign * multiplier * sd.as_ref()?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
