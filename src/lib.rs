//! rulesim: rule-based long-only strategy backtester and optimizer.
//!
//! Hexagonal architecture: the simulation engine lives in [`domain`], port
//! traits in [`ports`], concrete file/log implementations in [`adapters`],
//! and the command-line driver in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
