//! Time-boxed random search for a more profitable strategy.
//!
//! Each candidate is one buy rule and one sell rule drawn at random. The
//! search runs in chunks: candidates for a chunk are drawn sequentially from
//! the caller's RNG, backtested (optionally in parallel), and the chunk's
//! best replaces the overall best only if strictly more profitable. The
//! deadline is checked between chunks, never inside one.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use tracing::info;

use super::backtest::{simulate, BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use super::candle::{average_close, Candle};
use super::indicator::IndicatorType;
use super::rule::{Action, Condition, Operator, RightOperand, Rule, Side};
use super::strategy::Strategy;
use crate::ports::progress_port::ProgressPort;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_REPORT_EVERY: usize = 500;

/// Share of capital a candidate commits to one position.
const CAPITAL_FRACTION: f64 = 0.9;
const OFFSET_PROBABILITY: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub duration: Duration,
    pub initial_capital: f64,
    pub chunk_size: usize,
    pub report_every: usize,
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            duration: DEFAULT_DURATION,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            report_every: DEFAULT_REPORT_EVERY,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub strategy: Strategy,
    pub net_profit: f64,
    pub baseline_net_profit: f64,
    pub iterations: usize,
}

impl OptimizationOutcome {
    pub fn improved(&self) -> bool {
        self.net_profit > self.baseline_net_profit
    }
}

/// Units per candidate order: 90% of capital at the average close, at
/// least one.
pub fn candidate_quantity(initial_capital: f64, average_price: f64) -> u64 {
    if average_price <= 0.0 || !average_price.is_finite() {
        return 1;
    }
    let units = (initial_capital * CAPITAL_FRACTION / average_price).floor();
    if units >= 1.0 { units as u64 } else { 1 }
}

fn random_indicator(rng: &mut impl Rng) -> IndicatorType {
    match rng.gen_range(0..5) {
        0 => IndicatorType::Sma(rng.gen_range(10..200)),
        1 => IndicatorType::Ema(rng.gen_range(10..200)),
        2 => IndicatorType::Rsi(rng.gen_range(5..25)),
        3 => IndicatorType::Roc(rng.gen_range(1..21)),
        _ => IndicatorType::Price,
    }
}

/// Literal threshold suited to the left indicator's scale.
fn random_threshold(left: IndicatorType, rng: &mut impl Rng) -> f64 {
    match left {
        IndicatorType::Rsi(_) => f64::from(rng.gen_range(15..85_i32)),
        IndicatorType::Roc(_) => f64::from(rng.gen_range(-5..5_i32)),
        _ => 0.0,
    }
}

fn random_rule(id: String, side: Side, quantity: u64, rng: &mut impl Rng) -> Rule {
    let left = random_indicator(rng);
    let right = if rng.gen_bool(0.5) {
        RightOperand::Value(random_threshold(left, rng))
    } else {
        RightOperand::Indicator(random_indicator(rng))
    };
    let operator = if rng.gen_bool(0.5) {
        Operator::Gt
    } else {
        Operator::Lt
    };
    let offset_pct = rng
        .gen_bool(OFFSET_PROBABILITY)
        .then(|| f64::from(rng.gen_range(-5..5_i32)));

    Rule {
        id,
        condition: Condition {
            left,
            operator,
            right,
            offset_pct,
        },
        action: Action { side, quantity },
    }
}

/// One buy rule then one sell rule, both trading `quantity` units.
pub fn random_strategy(id: &str, quantity: u64, rng: &mut impl Rng) -> Strategy {
    let buy = random_rule(format!("{}-buy", id), Side::Buy, quantity, rng);
    let sell = random_rule(format!("{}-sell", id), Side::Sell, quantity, rng);
    Strategy {
        id: id.to_string(),
        name: "Optimized".to_string(),
        rules: vec![buy, sell],
    }
}

/// Prefer higher profit, then the earlier candidate. Commutative and
/// associative, so sequential and parallel reductions agree.
fn better(a: (usize, f64), b: (usize, f64)) -> (usize, f64) {
    if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
        b
    } else {
        a
    }
}

/// Index and net profit of the most profitable candidate.
pub fn best_of_chunk(
    candidates: &[Strategy],
    candles: &[Candle],
    config: &BacktestConfig,
    parallel: bool,
) -> Option<(usize, f64)> {
    let evaluate =
        |(i, s): (usize, &Strategy)| (i, simulate(s, candles, config).metrics.net_profit);

    if parallel {
        candidates.par_iter().enumerate().map(evaluate).reduce_with(better)
    } else {
        candidates.iter().enumerate().map(evaluate).reduce(better)
    }
}

/// Search for a strategy that beats `baseline` on net profit until
/// `config.duration` has elapsed. Never returns anything worse than the
/// baseline.
pub fn optimize<R: Rng>(
    baseline: &Strategy,
    candles: &[Candle],
    config: &OptimizerConfig,
    rng: &mut R,
    progress: &dyn ProgressPort,
) -> OptimizationOutcome {
    let start = Instant::now();
    let bt_config = BacktestConfig {
        initial_capital: config.initial_capital,
        max_trades: None,
    };

    let baseline_net_profit = simulate(baseline, candles, &bt_config).metrics.net_profit;
    let mut best = baseline.clone();
    let mut best_profit = baseline_net_profit;

    let Some(average_price) = average_close(candles) else {
        progress.report(&finished_message(0, best_profit));
        return OptimizationOutcome {
            strategy: best,
            net_profit: best_profit,
            baseline_net_profit,
            iterations: 0,
        };
    };

    let quantity = candidate_quantity(config.initial_capital, average_price);
    let chunk_size = config.chunk_size.max(1);
    let report_every = config.report_every.max(1);
    let mut iterations = 0usize;

    info!(
        bars = candles.len(),
        baseline_net_profit,
        quantity,
        duration_ms = config.duration.as_millis() as u64,
        parallel = config.parallel,
        "optimizer started"
    );

    while start.elapsed() <= config.duration {
        let mut candidates: Vec<Strategy> = (0..chunk_size)
            .map(|k| random_strategy(&format!("candidate-{}", iterations + k + 1), quantity, rng))
            .collect();

        if let Some((index, profit)) =
            best_of_chunk(&candidates, candles, &bt_config, config.parallel)
        {
            if profit > best_profit {
                best_profit = profit;
                best = candidates.swap_remove(index);
            }
        }

        let before = iterations;
        iterations += chunk_size;
        if iterations / report_every > before / report_every {
            let elapsed = start.elapsed().as_secs_f64();
            let total = config.duration.as_secs_f64();
            let pct = if total > 0.0 { (elapsed / total * 100.0).min(100.0) } else { 100.0 };
            progress.report(&format!("Thinking... {:.0}%", pct));
        }

        progress.yield_now();
    }

    info!(iterations, best_profit, strategy = %best.id, "optimizer finished");
    progress.report(&finished_message(iterations, best_profit));

    OptimizationOutcome {
        strategy: best,
        net_profit: best_profit,
        baseline_net_profit,
        iterations,
    }
}

fn finished_message(iterations: usize, best_profit: f64) -> String {
    format!(
        "Optimized {} strategies. Best Net Profit: ${:.2}",
        iterations, best_profit
    )
}

/// Run [`optimize`] on a worker thread. Progress flows through `progress`
/// (typically a channel) while the caller stays free.
pub fn spawn_optimizer<R, P>(
    baseline: Strategy,
    candles: Vec<Candle>,
    config: OptimizerConfig,
    mut rng: R,
    progress: P,
) -> JoinHandle<OptimizationOutcome>
where
    R: Rng + Send + 'static,
    P: ProgressPort + Send + 'static,
{
    thread::spawn(move || optimize(&baseline, &candles, &config, &mut rng, &progress))
}
