//! Daily OHLCV candle.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Closing prices of a date-ascending candle sequence, in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Arithmetic mean of the closing prices, or `None` for an empty slice.
pub fn average_close(candles: &[Candle]) -> Option<f64> {
    if candles.is_empty() {
        return None;
    }
    Some(candles.iter().map(|c| c.close).sum::<f64>() / candles.len() as f64)
}
