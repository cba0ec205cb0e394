//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(fast) - EMA(slow), defined from index max(fast, slow) - 1.
//! Signal line = EMA(signal) over the defined suffix of the MACD line,
//! realigned to the input. Histogram = MACD line - signal line.

use super::{calculate_ema, Series};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let len = prices.len();
    if fast == 0 || slow == 0 || signal == 0 {
        return MacdSeries {
            line: vec![None; len],
            signal: vec![None; len],
            histogram: vec![None; len],
        };
    }

    let fast_ema = calculate_ema(prices, fast);
    let slow_ema = calculate_ema(prices, slow);
    let line: Series = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some(f.as_ref()? - s.as_ref()?))
        .collect();

    let mut signal_line = vec![None; len];
    if let Some(start) = line.iter().position(Option::is_some) {
        let defined: Vec<f64> = line[start..].iter().flatten().copied().collect();
        for (offset, value) in calculate_ema(&defined, signal).into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some(m.as_ref()? - s.as_ref()?))
        .collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}
