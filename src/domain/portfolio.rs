//! Portfolio state and equity tracking.

use chrono::NaiveDate;

use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    /// Units held; always the sum of open trade quantities.
    pub position: u64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: 0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    pub fn open_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.is_open())
    }

    pub fn open_trades_mut(&mut self) -> impl Iterator<Item = &mut Trade> {
        self.trades.iter_mut().filter(|t| t.is_open())
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position as f64 * price
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map_or(self.initial_capital, |p| p.equity)
    }
}
