//! JSON strategy file adapter.
//!
//! The file shape mirrors the strategy editor's export:
//! `{id, name, rules: [{id, condition: {left, operator, right}, action}]}`.
//! Type tags and operators are checked here, so the domain only ever sees
//! the closed enums.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::RulesimError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::IndicatorType;
use crate::domain::rule::{Action, Condition, Operator, RightOperand, Rule, Side};
use crate::domain::strategy::Strategy;
use crate::ports::strategy_port::StrategyPort;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Serialize, Deserialize)]
struct StrategyDto {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rules: Vec<RuleDto>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleDto {
    #[serde(default)]
    id: String,
    condition: ConditionDto,
    action: ActionDto,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConditionDto {
    left: IndicatorDto,
    operator: String,
    right: RightDto,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndicatorDto {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fast_period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slow_period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signal_period: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RightDto {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indicator: Option<IndicatorDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_percent: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActionDto {
    #[serde(rename = "type")]
    kind: String,
    quantity: u64,
}

fn indicator_from_dto(dto: &IndicatorDto) -> Result<IndicatorType, String> {
    // A zero period counts as unset.
    let period = |p: Option<usize>, default: usize| p.filter(|&p| p > 0).unwrap_or(default);
    let length = period(dto.period, DEFAULT_PERIOD);
    let kind = match dto.kind.as_str() {
        "price" => IndicatorType::Price,
        "sma" => IndicatorType::Sma(length),
        "ema" => IndicatorType::Ema(length),
        "rsi" => IndicatorType::Rsi(length),
        "roc" => IndicatorType::Roc(length),
        "macd" => IndicatorType::Macd {
            fast: period(dto.fast_period, DEFAULT_FAST),
            slow: period(dto.slow_period, DEFAULT_SLOW),
            signal: period(dto.signal_period, DEFAULT_SIGNAL),
        },
        other => return Err(format!("unknown indicator type '{}'", other)),
    };
    Ok(kind)
}

fn indicator_to_dto(indicator: IndicatorType) -> IndicatorDto {
    let (kind, period) = match indicator {
        IndicatorType::Price => ("price", None),
        IndicatorType::Sma(p) => ("sma", Some(p)),
        IndicatorType::Ema(p) => ("ema", Some(p)),
        IndicatorType::Rsi(p) => ("rsi", Some(p)),
        IndicatorType::Roc(p) => ("roc", Some(p)),
        IndicatorType::Macd { .. } => ("macd", None),
    };
    let (fast_period, slow_period, signal_period) = match indicator {
        IndicatorType::Macd { fast, slow, signal } => (Some(fast), Some(slow), Some(signal)),
        _ => (None, None, None),
    };
    IndicatorDto {
        kind: kind.to_string(),
        period,
        fast_period,
        slow_period,
        signal_period,
    }
}

fn rule_from_dto(dto: &RuleDto, index: usize) -> Result<Rule, String> {
    let id = if dto.id.trim().is_empty() {
        format!("rule-{}", index + 1)
    } else {
        dto.id.clone()
    };
    let context = |reason: String| format!("rule '{}': {}", id, reason);

    let left = indicator_from_dto(&dto.condition.left).map_err(context)?;
    let operator = Operator::from_symbol(&dto.condition.operator)
        .ok_or_else(|| context(format!("unknown operator '{}'", dto.condition.operator)))?;

    let right_dto = &dto.condition.right;
    let right = match right_dto.kind.as_str() {
        "value" => RightOperand::Value(
            right_dto
                .value
                .ok_or_else(|| context("right operand of type 'value' has no value".to_string()))?,
        ),
        "indicator" => {
            let ind = right_dto.indicator.as_ref().ok_or_else(|| {
                context("right operand of type 'indicator' has no indicator".to_string())
            })?;
            RightOperand::Indicator(indicator_from_dto(ind).map_err(context)?)
        }
        other => return Err(context(format!("unknown right operand type '{}'", other))),
    };

    let side = match dto.action.kind.as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        other => return Err(context(format!("unknown action type '{}'", other))),
    };
    if dto.action.quantity == 0 {
        return Err(context("quantity must be at least 1".to_string()));
    }

    Ok(Rule {
        id,
        condition: Condition {
            left,
            operator,
            right,
            offset_pct: right_dto.offset_percent,
        },
        action: Action {
            side,
            quantity: dto.action.quantity,
        },
    })
}

fn rule_to_dto(rule: &Rule) -> RuleDto {
    let right = match rule.condition.right {
        RightOperand::Value(v) => RightDto {
            kind: "value".to_string(),
            value: Some(v),
            indicator: None,
            offset_percent: rule.condition.offset_pct,
        },
        RightOperand::Indicator(ind) => RightDto {
            kind: "indicator".to_string(),
            value: None,
            indicator: Some(indicator_to_dto(ind)),
            offset_percent: rule.condition.offset_pct,
        },
    };
    RuleDto {
        id: rule.id.clone(),
        condition: ConditionDto {
            left: indicator_to_dto(rule.condition.left),
            operator: rule.condition.operator.symbol().to_string(),
            right,
        },
        action: ActionDto {
            kind: rule.action.side.to_string(),
            quantity: rule.action.quantity,
        },
    }
}

/// Parse a strategy from JSON text. `source_name` labels errors.
pub fn parse_strategy(json: &str, source_name: &str) -> Result<Strategy, RulesimError> {
    let parse_err = |reason: String| RulesimError::StrategyParse {
        source_name: source_name.to_string(),
        reason,
    };

    let dto: StrategyDto = serde_json::from_str(json).map_err(|e| parse_err(e.to_string()))?;
    let rules = dto
        .rules
        .iter()
        .enumerate()
        .map(|(i, r)| rule_from_dto(r, i))
        .collect::<Result<Vec<_>, _>>()
        .map_err(parse_err)?;

    let name = if dto.name.trim().is_empty() {
        "Untitled".to_string()
    } else {
        dto.name
    };

    Ok(Strategy {
        id: dto.id,
        name,
        rules,
    })
}

pub fn strategy_to_json(strategy: &Strategy) -> Result<String, RulesimError> {
    let dto = StrategyDto {
        id: strategy.id.clone(),
        name: strategy.name.clone(),
        rules: strategy.rules.iter().map(rule_to_dto).collect(),
    };
    serde_json::to_string_pretty(&dto).map_err(|e| RulesimError::StrategyParse {
        source_name: strategy.name.clone(),
        reason: e.to_string(),
    })
}

pub struct JsonStrategyAdapter;

impl StrategyPort for JsonStrategyAdapter {
    fn load_strategy(&self, path: &Path) -> Result<Strategy, RulesimError> {
        let content = fs::read_to_string(path)?;
        parse_strategy(&content, &path.display().to_string())
    }

    fn save_strategy(&self, strategy: &Strategy, path: &Path) -> Result<(), RulesimError> {
        let json = strategy_to_json(strategy)?;
        fs::write(path, json)?;
        Ok(())
    }
}
