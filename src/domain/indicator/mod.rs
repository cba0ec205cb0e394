//! Technical indicator library.
//!
//! Every function takes a closing-price sequence and returns a [`Series`] of
//! the same length. The warm-up prefix, where not enough history exists for
//! the period, is `None`; it is exactly as long as the indicator requires and
//! no longer. A value at index `i` depends only on prices at indices `<= i`.
//!
//! [`IndicatorType`] names an indicator together with its parameters and is
//! the key under which computed series are cached.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod roc;
pub mod macd;
pub mod stddev;
pub mod bollinger;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use roc::calculate_roc;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use std::fmt;

/// A derived indicator series aligned with its input; `None` is "undefined".
pub type Series = Vec<Option<f64>>;

/// Indicators a rule condition can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Price,
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Roc(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    /// Compute this indicator over `closes`.
    ///
    /// MACD yields its MACD line; conditions never see the signal line or
    /// histogram.
    pub fn compute(&self, closes: &[f64]) -> Series {
        match *self {
            IndicatorType::Price => closes.iter().map(|&c| Some(c)).collect(),
            IndicatorType::Sma(period) => calculate_sma(closes, period),
            IndicatorType::Ema(period) => calculate_ema(closes, period),
            IndicatorType::Rsi(period) => calculate_rsi(closes, period),
            IndicatorType::Roc(period) => calculate_roc(closes, period),
            IndicatorType::Macd { fast, slow, signal } => {
                calculate_macd(closes, fast, slow, signal).line
            }
        }
    }

    /// Index of the first defined value, given enough input.
    ///
    /// `None` when a period is zero, in which case the series is entirely
    /// undefined.
    pub fn first_valid_index(&self) -> Option<usize> {
        match *self {
            IndicatorType::Price => Some(0),
            IndicatorType::Sma(p) | IndicatorType::Ema(p) => p.checked_sub(1),
            IndicatorType::Rsi(p) | IndicatorType::Roc(p) => (p > 0).then_some(p),
            IndicatorType::Macd { fast, slow, signal } => {
                if fast == 0 || slow == 0 || signal == 0 {
                    None
                } else {
                    Some(fast.max(slow) - 1)
                }
            }
        }
    }

    /// SMA and EMA are the indicators drawn on the price chart.
    pub fn is_moving_average(&self) -> bool {
        matches!(self, IndicatorType::Sma(_) | IndicatorType::Ema(_))
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Price => write!(f, "PRICE"),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Price.to_string(), "PRICE");
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Ema(20), "ema20");
        map.insert(IndicatorType::Sma(20), "sma20 again");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20 again"));
    }

    #[test]
    fn price_is_closes() {
        let closes = [1.0, 2.0, 3.0];
        assert_eq!(
            IndicatorType::Price.compute(&closes),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn macd_compute_is_macd_line() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let kind = IndicatorType::Macd {
            fast: 5,
            slow: 10,
            signal: 3,
        };
        assert_eq!(kind.compute(&closes), calculate_macd(&closes, 5, 10, 3).line);
    }

    #[test]
    fn moving_average_kinds() {
        assert!(IndicatorType::Sma(5).is_moving_average());
        assert!(IndicatorType::Ema(5).is_moving_average());
        assert!(!IndicatorType::Rsi(5).is_moving_average());
        assert!(!IndicatorType::Price.is_moving_average());
    }

    #[test]
    fn zero_period_has_no_valid_index() {
        assert_eq!(IndicatorType::Sma(0).first_valid_index(), None);
        assert_eq!(IndicatorType::Roc(0).first_valid_index(), None);
        assert_eq!(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 0
            }
            .first_valid_index(),
            None
        );
    }

    fn indicator_strategy() -> impl Strategy<Value = IndicatorType> {
        prop_oneof![
            Just(IndicatorType::Price),
            (1usize..30).prop_map(IndicatorType::Sma),
            (1usize..30).prop_map(IndicatorType::Ema),
            (1usize..30).prop_map(IndicatorType::Rsi),
            (1usize..30).prop_map(IndicatorType::Roc),
            (1usize..12, 1usize..20, 1usize..8).prop_map(|(fast, slow, signal)| {
                IndicatorType::Macd { fast, slow, signal }
            }),
        ]
    }

    proptest! {
        #[test]
        fn series_are_aligned_with_minimal_prefix(
            kind in indicator_strategy(),
            closes in prop::collection::vec(1.0f64..500.0, 0..80),
        ) {
            let series = kind.compute(&closes);
            prop_assert_eq!(series.len(), closes.len());

            let first = kind.first_valid_index().unwrap();
            for (i, value) in series.iter().enumerate() {
                if i < first {
                    prop_assert!(value.is_none(), "{} defined early at {}", kind, i);
                } else {
                    prop_assert!(value.is_some(), "{} undefined at {}", kind, i);
                }
            }
        }

        #[test]
        fn short_input_is_all_undefined(
            period in 2usize..40,
            closes in prop::collection::vec(1.0f64..500.0, 0..40),
        ) {
            prop_assume!(closes.len() < period);
            for kind in [
                IndicatorType::Sma(period),
                IndicatorType::Ema(period),
                IndicatorType::Rsi(period),
                IndicatorType::Roc(period),
            ] {
                prop_assert!(kind.compute(&closes).iter().all(Option::is_none));
            }
        }

        #[test]
        fn no_look_ahead(
            kind in indicator_strategy(),
            closes in prop::collection::vec(1.0f64..500.0, 1..60),
            cut in 0usize..60,
        ) {
            let cut = cut.min(closes.len());
            let full = kind.compute(&closes);
            let prefix = kind.compute(&closes[..cut]);
            prop_assert_eq!(&full[..cut], &prefix[..]);
        }
    }
}
