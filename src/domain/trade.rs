//! Trade ledger entries.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: u64,
    pub status: TradeStatus,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    /// Realized profit, set when the trade closes.
    pub pnl: Option<f64>,
    /// Id of the rule whose signal opened the trade.
    pub rule_id: String,
}

impl Trade {
    pub fn open(entry_date: NaiveDate, entry_price: f64, quantity: u64, rule_id: &str) -> Self {
        Trade {
            entry_date,
            entry_price,
            quantity,
            status: TradeStatus::Open,
            exit_date: None,
            exit_price: None,
            pnl: None,
            rule_id: rule_id.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Close at `exit_price` and return the sale proceeds.
    ///
    /// Closing an already-closed trade changes nothing and returns `None`.
    pub fn close(&mut self, exit_date: NaiveDate, exit_price: f64) -> Option<f64> {
        if !self.is_open() {
            return None;
        }
        self.status = TradeStatus::Closed;
        self.exit_date = Some(exit_date);
        self.exit_price = Some(exit_price);
        self.pnl = Some((exit_price - self.entry_price) * self.quantity as f64);
        Some(exit_price * self.quantity as f64)
    }

    pub fn cost(&self) -> f64 {
        self.entry_price * self.quantity as f64
    }
}
