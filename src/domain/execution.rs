//! Fill simulation against the portfolio ledger.
//!
//! Fills happen at the bar's open. A fill that cannot happen (not flat, not
//! enough cash, trade cap reached, nothing to sell) leaves the portfolio
//! untouched and reports why.

use chrono::NaiveDate;
use tracing::debug;

use super::portfolio::Portfolio;
use super::trade::Trade;

/// Result of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyOutcome {
    Filled { quantity: u64, price: f64, cost: f64 },
    NotFlat { position: u64 },
    InsufficientCash { cost: f64, cash: f64 },
    TradeCapReached { cap: usize },
    ZeroQuantity,
}

/// Result of a sell attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SellOutcome {
    Filled {
        trades_closed: usize,
        quantity: u64,
        price: f64,
        proceeds: f64,
    },
    NoPosition,
}

/// Open a new long trade of `quantity` units at `price`.
///
/// Checks, in order: flat position, sufficient cash, trade cap. The cap
/// counts every trade opened so far in the run.
pub fn execute_buy(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    price: f64,
    quantity: u64,
    rule_id: &str,
    max_trades: Option<usize>,
) -> BuyOutcome {
    if quantity == 0 {
        debug!(%date, rule = rule_id, "buy skipped: zero quantity");
        return BuyOutcome::ZeroQuantity;
    }
    if !portfolio.is_flat() {
        debug!(%date, rule = rule_id, position = portfolio.position, "buy skipped: not flat");
        return BuyOutcome::NotFlat {
            position: portfolio.position,
        };
    }

    let cost = price * quantity as f64;
    if portfolio.cash < cost {
        debug!(%date, rule = rule_id, cost, cash = portfolio.cash, "buy skipped: insufficient cash");
        return BuyOutcome::InsufficientCash {
            cost,
            cash: portfolio.cash,
        };
    }

    if let Some(cap) = max_trades {
        if portfolio.trade_count() >= cap {
            debug!(%date, rule = rule_id, cap, "buy skipped: trade cap reached");
            return BuyOutcome::TradeCapReached { cap };
        }
    }

    portfolio.cash -= cost;
    portfolio.position += quantity;
    portfolio.trades.push(Trade::open(date, price, quantity, rule_id));

    BuyOutcome::Filled {
        quantity,
        price,
        cost,
    }
}

/// Close open trades oldest-first at `price` until `quantity` units (capped
/// at the current position) are consumed.
///
/// A trade touched by the sell is closed whole.
pub fn execute_sell(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    price: f64,
    quantity: u64,
) -> SellOutcome {
    if portfolio.position == 0 {
        debug!(%date, "sell skipped: no position");
        return SellOutcome::NoPosition;
    }

    let mut remaining = quantity.min(portfolio.position);
    let mut trades_closed = 0;
    let mut sold = 0;
    let mut proceeds = 0.0;

    for trade in portfolio.open_trades_mut() {
        if remaining == 0 {
            break;
        }
        if let Some(amount) = trade.close(date, price) {
            proceeds += amount;
            sold += trade.quantity;
            remaining = remaining.saturating_sub(trade.quantity);
            trades_closed += 1;
        }
    }

    portfolio.cash += proceeds;
    portfolio.position -= sold;

    SellOutcome::Filled {
        trades_closed,
        quantity: sold,
        price,
        proceeds,
    }
}
