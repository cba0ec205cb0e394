//! Core simulation engine: indicators, rule evaluation, backtest, optimizer.
//!
//! Nothing in this module performs I/O.

pub mod candle;
pub mod indicator;
pub mod rule;
pub mod strategy;
pub mod rule_eval;
pub mod trade;
pub mod portfolio;
pub mod execution;
pub mod metrics;
pub mod overlay;
pub mod backtest;
pub mod optimizer;
pub mod config_validation;
pub mod error;
