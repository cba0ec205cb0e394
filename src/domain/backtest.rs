//! Backtest engine and event loop.
//!
//! Each bar runs three phases in order:
//! 1. Fill the order queued on the previous bar at this bar's open
//! 2. Evaluate rules at this bar's close; sell rules first, then buy rules,
//!    first true rule in declared order wins; queue it for the next bar
//! 3. Mark to market at the close
//!
//! A signal raised on the last bar has no next open and is dropped.

use tracing::{debug, info};

use super::candle::Candle;
use super::error::RulesimError;
use super::execution::{execute_buy, execute_sell, BuyOutcome, SellOutcome};
use super::metrics::Metrics;
use super::overlay::{strategy_overlays, IndicatorOverlay};
use super::portfolio::{EquityPoint, Portfolio};
use super::rule::{Rule, Side};
use super::rule_eval::RuleEvaluator;
use super::strategy::Strategy;
use super::trade::Trade;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Upper bound on trades opened over the whole run.
    pub max_trades: Option<usize>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            max_trades: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: Strategy,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
    pub overlays: Vec<IndicatorOverlay>,
}

impl BacktestResult {
    /// The rule that opened `trade`, if it is still in the strategy.
    pub fn rule_for(&self, trade: &Trade) -> Option<&Rule> {
        self.strategy.rules.iter().find(|r| r.id == trade.rule_id)
    }
}

/// Run `strategy` over `candles`. Never fails; an empty candle sequence
/// yields an empty result with zero metrics.
pub fn simulate(strategy: &Strategy, candles: &[Candle], config: &BacktestConfig) -> BacktestResult {
    let evaluator = RuleEvaluator::prepare(strategy, candles);
    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut pending: Option<&Rule> = None;

    for (i, candle) in candles.iter().enumerate() {
        if let Some(rule) = pending.take() {
            fill(&mut portfolio, candle, rule, config.max_trades);
        }

        pending = first_signal(strategy, &evaluator, Side::Sell, i)
            .or_else(|| first_signal(strategy, &evaluator, Side::Buy, i));

        let equity = portfolio.equity(candle.close);
        portfolio.record_equity(candle.date, equity);
    }

    if let Some(rule) = pending {
        debug!(rule = %rule.id, "signal on final bar dropped");
    }
    debug!(
        trades = portfolio.trade_count(),
        open = portfolio.open_trades().count(),
        position = portfolio.position,
        "simulation finished"
    );

    let metrics = if candles.is_empty() {
        Metrics::empty(config.initial_capital)
    } else {
        Metrics::compute(&portfolio)
    };

    BacktestResult {
        strategy: strategy.clone(),
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
        metrics,
        overlays: strategy_overlays(strategy, candles),
    }
}

/// Validated entry point: rejects a strategy with no rules, then an empty
/// candle sequence, before simulating.
pub fn run_backtest(
    strategy: &Strategy,
    candles: &[Candle],
    config: &BacktestConfig,
) -> Result<BacktestResult, RulesimError> {
    if strategy.rules.is_empty() {
        return Err(RulesimError::EmptyStrategy {
            strategy: strategy.name.clone(),
        });
    }
    if candles.is_empty() {
        return Err(RulesimError::NoData {
            context: format!("cannot backtest '{}' over an empty series", strategy.name),
        });
    }

    info!(
        strategy = %strategy.name,
        rules = strategy.rules.len(),
        bars = candles.len(),
        initial_capital = config.initial_capital,
        "running backtest"
    );
    let result = simulate(strategy, candles, config);
    info!(
        trades = result.metrics.total_trades,
        net_profit = result.metrics.net_profit,
        "backtest complete"
    );

    Ok(result)
}

fn first_signal<'s>(
    strategy: &'s Strategy,
    evaluator: &RuleEvaluator,
    side: Side,
    index: usize,
) -> Option<&'s Rule> {
    strategy
        .rules_for(side)
        .find(|rule| evaluator.evaluate(rule, index))
}

fn fill(portfolio: &mut Portfolio, candle: &Candle, rule: &Rule, max_trades: Option<usize>) {
    let quantity = rule.action.quantity;
    match rule.action.side {
        Side::Buy => {
            let outcome = execute_buy(
                portfolio,
                candle.date,
                candle.open,
                quantity,
                &rule.id,
                max_trades,
            );
            if let BuyOutcome::Filled { price, .. } = outcome {
                debug!(date = %candle.date, rule = %rule.id, quantity, price, "bought");
            }
        }
        Side::Sell => {
            let outcome = execute_sell(portfolio, candle.date, candle.open, quantity);
            if let SellOutcome::Filled {
                trades_closed,
                quantity,
                price,
                ..
            } = outcome
            {
                debug!(date = %candle.date, rule = %rule.id, trades_closed, quantity, price, "sold");
            }
        }
    }
}
