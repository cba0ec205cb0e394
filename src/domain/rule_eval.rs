//! Rule evaluation engine.
//!
//! A [`RuleEvaluator`] is built once per run. It computes every distinct
//! indicator the strategy references and answers condition queries by index.
//!
//! # Evaluation Semantics
//!
//! - Left operand: the cached indicator value at the index
//! - Right operand: the literal, or the cached value of the right indicator
//! - Offset: the right value is scaled by `1 + offset/100`
//! - An undefined operand (warm-up, out of range) makes the condition `false`

use std::collections::HashMap;

use tracing::debug;

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{IndicatorType, Series};
use crate::domain::rule::{Condition, RightOperand, Rule};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    cache: HashMap<IndicatorType, Series>,
}

impl RuleEvaluator {
    /// Compute each distinct indicator referenced by `strategy` over the
    /// closing prices of `candles`.
    pub fn prepare(strategy: &Strategy, candles: &[Candle]) -> Self {
        let prices = closes(candles);
        let cache: HashMap<IndicatorType, Series> = strategy
            .indicators()
            .into_iter()
            .map(|ind| (ind, ind.compute(&prices)))
            .collect();

        debug!(
            strategy = %strategy.id,
            series = cache.len(),
            bars = candles.len(),
            "indicator cache built"
        );

        Self { cache }
    }

    pub fn evaluate(&self, rule: &Rule, index: usize) -> bool {
        self.evaluate_condition(&rule.condition, index)
    }

    pub fn evaluate_condition(&self, condition: &Condition, index: usize) -> bool {
        let Some(left) = self.value(condition.left, index) else {
            return false;
        };
        let right = match condition.right {
            RightOperand::Value(v) => v,
            RightOperand::Indicator(ind) => match self.value(ind, index) {
                Some(v) => v,
                None => return false,
            },
        };
        let right = match condition.offset_pct {
            Some(pct) => right * (1.0 + pct / 100.0),
            None => right,
        };

        condition.operator.apply(left, right)
    }

    /// Cached value of `indicator` at `index`; `None` when undefined.
    pub fn value(&self, indicator: IndicatorType, index: usize) -> Option<f64> {
        self.cache.get(&indicator)?.get(index).copied().flatten()
    }

    /// Number of distinct series in the cache.
    pub fn cached_series(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{Action, Operator, Side};
    use chrono::NaiveDate;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle {
                date: start + chrono::Duration::days(i as i64),
                open: p,
                high: p,
                low: p,
                close: p,
                volume: 1000.0,
            })
            .collect()
    }

    fn rule(left: IndicatorType, operator: Operator, right: RightOperand, offset: Option<f64>) -> Rule {
        Rule {
            id: "r".into(),
            condition: Condition {
                left,
                operator,
                right,
                offset_pct: offset,
            },
            action: Action {
                side: Side::Buy,
                quantity: 1,
            },
        }
    }

    fn strategy(rules: Vec<Rule>) -> Strategy {
        Strategy {
            id: "s".into(),
            name: "test".into(),
            rules,
        }
    }

    #[test]
    fn price_against_value() {
        let candles = make_candles(&[10.0, 13.0]);
        let r = rule(IndicatorType::Price, Operator::Gt, RightOperand::Value(12.0), None);
        let eval = RuleEvaluator::prepare(&strategy(vec![r.clone()]), &candles);

        assert!(!eval.evaluate(&r, 0));
        assert!(eval.evaluate(&r, 1));
    }

    #[test]
    fn undefined_operand_is_false() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0]);
        let r = rule(IndicatorType::Sma(3), Operator::Gt, RightOperand::Value(0.0), None);
        let eval = RuleEvaluator::prepare(&strategy(vec![r.clone()]), &candles);

        assert!(!eval.evaluate(&r, 0));
        assert!(!eval.evaluate(&r, 1));
        assert!(eval.evaluate(&r, 2));
        // Negation would still be false while warming up.
        let lt = rule(IndicatorType::Sma(3), Operator::Lt, RightOperand::Value(0.0), None);
        assert!(!eval.evaluate(&lt, 1));
    }

    #[test]
    fn undefined_right_indicator_is_false() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0]);
        let r = rule(
            IndicatorType::Price,
            Operator::Gt,
            RightOperand::Indicator(IndicatorType::Sma(4)),
            None,
        );
        let eval = RuleEvaluator::prepare(&strategy(vec![r.clone()]), &candles);
        assert!(!eval.evaluate(&r, 2));
        assert!(eval.evaluate(&r, 3));
    }

    #[test]
    fn out_of_range_index_is_false() {
        let candles = make_candles(&[10.0]);
        let r = rule(IndicatorType::Price, Operator::Gt, RightOperand::Value(0.0), None);
        let eval = RuleEvaluator::prepare(&strategy(vec![r.clone()]), &candles);
        assert!(!eval.evaluate(&r, 5));
    }

    #[test]
    fn offset_scales_right_operand() {
        let candles = make_candles(&[104.0]);
        let plain = rule(IndicatorType::Price, Operator::Gt, RightOperand::Value(100.0), None);
        let offset = rule(
            IndicatorType::Price,
            Operator::Gt,
            RightOperand::Value(100.0),
            Some(5.0),
        );
        let eval = RuleEvaluator::prepare(&strategy(vec![plain.clone()]), &candles);

        assert!(eval.evaluate(&plain, 0));
        assert!(!eval.evaluate(&offset, 0));
    }

    #[test]
    fn identical_configurations_share_one_series() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let a = rule(
            IndicatorType::Sma(2),
            Operator::Gt,
            RightOperand::Indicator(IndicatorType::Ema(3)),
            None,
        );
        let b = rule(IndicatorType::Ema(3), Operator::Lt, RightOperand::Value(10.0), None);
        let c = rule(IndicatorType::Sma(2), Operator::Gt, RightOperand::Value(1.0), None);
        let eval = RuleEvaluator::prepare(&strategy(vec![a, b, c]), &candles);

        assert_eq!(eval.cached_series(), 2);
    }

    #[test]
    fn indicator_missing_from_cache_is_false() {
        let candles = make_candles(&[1.0, 2.0, 3.0]);
        let cached = rule(IndicatorType::Price, Operator::Gt, RightOperand::Value(0.0), None);
        let foreign = rule(IndicatorType::Rsi(2), Operator::Ge, RightOperand::Value(0.0), None);
        let eval = RuleEvaluator::prepare(&strategy(vec![cached]), &candles);

        assert!(!eval.evaluate(&foreign, 2));
        assert_eq!(eval.value(IndicatorType::Rsi(2), 2), None);
    }

    #[test]
    fn equality_is_exact() {
        let candles = make_candles(&[12.0]);
        let eq = rule(IndicatorType::Price, Operator::Eq, RightOperand::Value(12.0), None);
        let near = rule(
            IndicatorType::Price,
            Operator::Eq,
            RightOperand::Value(12.000_000_1),
            None,
        );
        let eval = RuleEvaluator::prepare(&strategy(vec![eq.clone()]), &candles);
        assert!(eval.evaluate(&eq, 0));
        assert!(!eval.evaluate(&near, 0));
    }
}
