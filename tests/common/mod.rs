#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use rulesim::domain::candle::Candle;
use rulesim::domain::indicator::IndicatorType;
use rulesim::domain::rule::{Action, Condition, Operator, RightOperand, Rule, Side};
use rulesim::domain::strategy::Strategy;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily candles from 2024-01-01, one per `(open, close)` pair.
pub fn candles_oc(bars: &[(f64, f64)]) -> Vec<Candle> {
    bars.iter()
        .enumerate()
        .map(|(i, &(open, close))| Candle {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1000.0,
        })
        .collect()
}

/// The five-bar series behind the 1000 → 1020 → 1030 → 970 equity walk.
pub fn sample_candles() -> Vec<Candle> {
    candles_oc(&[
        (10.0, 11.0),
        (11.0, 13.0),
        (13.0, 15.0),
        (15.0, 16.0),
        (16.0, 10.0),
    ])
}

/// A slow sine-ish wave, long enough for every default indicator to mature.
pub fn wave_candles(n: usize) -> Vec<Candle> {
    let bars: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 15.0 * (x / 9.0).sin() + 0.05 * x;
            let open = close - 0.5 * (x / 4.0).cos();
            (open, close)
        })
        .collect();
    candles_oc(&bars)
}

pub fn price_rule(id: &str, operator: Operator, threshold: f64, side: Side, quantity: u64) -> Rule {
    Rule {
        id: id.into(),
        condition: Condition {
            left: IndicatorType::Price,
            operator,
            right: RightOperand::Value(threshold),
            offset_pct: None,
        },
        action: Action { side, quantity },
    }
}

pub fn strategy(rules: Vec<Rule>) -> Strategy {
    Strategy {
        id: "s1".into(),
        name: "Test".into(),
        rules,
    }
}

pub fn threshold_strategy() -> Strategy {
    strategy(vec![
        price_rule("buy", Operator::Gt, 12.0, Side::Buy, 10),
        price_rule("sell", Operator::Ge, 16.0, Side::Sell, 10),
    ])
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

pub fn candles_csv(candles: &[Candle]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.date, c.open, c.high, c.low, c.close, c.volume
        ));
    }
    out
}

pub const THRESHOLD_JSON: &str = r#"{
    "id": "threshold",
    "name": "Threshold",
    "rules": [
        {
            "id": "buy",
            "condition": {"left": {"type": "price"}, "operator": ">", "right": {"type": "value", "value": 12}},
            "action": {"type": "buy", "quantity": 10}
        },
        {
            "id": "sell",
            "condition": {"left": {"type": "price"}, "operator": ">=", "right": {"type": "value", "value": 16}},
            "action": {"type": "sell", "quantity": 10}
        }
    ]
}"#;
