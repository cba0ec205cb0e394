//! Indicator overlays for charting a backtest.
//!
//! Two sources: the SMA/EMA configurations a strategy references, and a set
//! of user-chosen chart indicators ([`OverlaySettings`]). Both are computed
//! over the full candle history, independent of the simulation.

use chrono::NaiveDate;

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{calculate_bollinger, IndicatorType, Series};
use crate::domain::strategy::Strategy;

pub const SMA_COLOR: &str = "#2962FF";
pub const EMA_COLOR: &str = "#E91E63";
pub const RSI_COLOR: &str = "#9C27B0";
pub const BOLLINGER_COLOR: &str = "#2196F3";
pub const DEFAULT_COLOR: &str = "#FFA726";

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named series with undefined points dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOverlay {
    pub name: String,
    pub color: &'static str,
    pub points: Vec<OverlayPoint>,
}

impl IndicatorOverlay {
    fn from_series(name: String, color: &'static str, candles: &[Candle], series: &Series) -> Self {
        let points = candles
            .iter()
            .zip(series)
            .filter_map(|(c, v)| v.map(|value| OverlayPoint { date: c.date, value }))
            .collect();
        IndicatorOverlay {
            name,
            color,
            points,
        }
    }
}

fn overlay_name(indicator: IndicatorType) -> String {
    match indicator {
        IndicatorType::Sma(p) => format!("SMA {}", p),
        IndicatorType::Ema(p) => format!("EMA {}", p),
        IndicatorType::Rsi(p) => format!("RSI {}", p),
        other => other.to_string(),
    }
}

fn overlay_color(indicator: IndicatorType) -> &'static str {
    match indicator {
        IndicatorType::Sma(_) => SMA_COLOR,
        IndicatorType::Ema(_) => EMA_COLOR,
        IndicatorType::Rsi(_) => RSI_COLOR,
        _ => DEFAULT_COLOR,
    }
}

/// One overlay per distinct SMA/EMA configuration in `strategy`, in
/// first-reference order.
pub fn strategy_overlays(strategy: &Strategy, candles: &[Candle]) -> Vec<IndicatorOverlay> {
    let prices = closes(candles);
    strategy
        .moving_averages()
        .into_iter()
        .map(|ind| {
            IndicatorOverlay::from_series(
                overlay_name(ind),
                overlay_color(ind),
                candles,
                &ind.compute(&prices),
            )
        })
        .collect()
}

/// Chart indicators a user can switch on independently of any strategy.
/// `None` means hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySettings {
    pub sma: Option<usize>,
    pub ema: Option<usize>,
    pub rsi: Option<usize>,
    pub bollinger: Option<BollingerSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerSettings {
    pub period: usize,
    pub multiplier: f64,
}

pub const DEFAULT_SMA_PERIOD: usize = 20;
pub const DEFAULT_EMA_PERIOD: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_BOLLINGER: BollingerSettings = BollingerSettings {
    period: 20,
    multiplier: 2.0,
};

impl OverlaySettings {
    pub fn is_empty(&self) -> bool {
        self.sma.is_none() && self.ema.is_none() && self.rsi.is_none() && self.bollinger.is_none()
    }
}

/// Overlays for every visible chart indicator. Bollinger Bands contribute
/// three overlays (upper, middle, lower).
pub fn chart_overlays(settings: &OverlaySettings, candles: &[Candle]) -> Vec<IndicatorOverlay> {
    let prices = closes(candles);
    let mut overlays = Vec::new();

    let singles = [
        settings.sma.map(IndicatorType::Sma),
        settings.ema.map(IndicatorType::Ema),
        settings.rsi.map(IndicatorType::Rsi),
    ];
    for ind in singles.into_iter().flatten() {
        overlays.push(IndicatorOverlay::from_series(
            overlay_name(ind),
            overlay_color(ind),
            candles,
            &ind.compute(&prices),
        ));
    }

    if let Some(bb) = settings.bollinger {
        let bands = calculate_bollinger(&prices, bb.period, bb.multiplier);
        for (label, series) in [
            ("upper", &bands.upper),
            ("middle", &bands.middle),
            ("lower", &bands.lower),
        ] {
            overlays.push(IndicatorOverlay::from_series(
                format!("BB {} {}", bb.period, label),
                BOLLINGER_COLOR,
                candles,
                series,
            ));
        }
    }

    overlays
}
