//! Performance metrics.
//!
//! Returns, win rate and drawdown are expressed in percent.

use super::portfolio::{EquityPoint, Portfolio};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub net_profit: f64,
    /// Every trade opened during the run, open or closed.
    pub total_trades: usize,
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    pub final_equity: f64,
}

impl Metrics {
    /// Metrics for a run with no bars: everything zero, equity untouched.
    pub fn empty(initial_capital: f64) -> Self {
        Metrics {
            total_return: 0.0,
            net_profit: 0.0,
            total_trades: 0,
            closed_trades: 0,
            winning_trades: 0,
            win_rate: 0.0,
            max_drawdown: 0.0,
            max_drawdown_duration: 0,
            final_equity: initial_capital,
        }
    }

    pub fn compute(portfolio: &Portfolio) -> Self {
        let initial_capital = portfolio.initial_capital;
        let final_equity = portfolio.final_equity();
        let net_profit = final_equity - initial_capital;

        let total_return = if initial_capital > 0.0 {
            net_profit / initial_capital * 100.0
        } else {
            0.0
        };

        let closed: Vec<f64> = portfolio.trades.iter().filter_map(|t| t.pnl).collect();
        let winning_trades = closed.iter().filter(|&&pnl| pnl > 0.0).count();
        let win_rate = if closed.is_empty() {
            0.0
        } else {
            winning_trades as f64 / closed.len() as f64 * 100.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&portfolio.equity_curve);

        Metrics {
            total_return,
            net_profit,
            total_trades: portfolio.trades.len(),
            closed_trades: closed.len(),
            winning_trades,
            win_rate,
            max_drawdown,
            max_drawdown_duration,
            final_equity,
        }
    }
}

/// Maximum percentage decline from a running peak, and the longest stretch
/// of bars spent under water. Points are ignored while the peak is not
/// positive.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
            current_duration += 1;
            if current_duration > max_duration {
                max_duration = current_duration;
            }
        }
    }

    (max_dd, max_duration)
}
