//! Configuration validation.
//!
//! Checks every `[backtest]`, `[optimizer]` and `[overlays]` key before a
//! run. Keys are optional; a key that is present must parse and be in range.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::error::RulesimError;
use crate::ports::config_port::ConfigPort;

pub const OVERLAY_NAMES: [&str; 4] = ["sma", "ema", "rsi", "bollinger"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    validate_initial_capital(config, "backtest")?;
    validate_max_trades(config)?;
    validate_dates(config)?;
    validate_data_path(config)?;
    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    validate_initial_capital(config, "optimizer")?;
    validate_positive_int(config, "optimizer", "duration_ms")?;
    validate_positive_int(config, "optimizer", "chunk_size")?;
    validate_positive_int(config, "optimizer", "report_every")?;
    validate_bool(config, "optimizer", "parallel")?;
    parse_key::<u64>(config, "optimizer", "seed", "seed must be a non-negative integer")?;
    Ok(())
}

pub fn validate_overlay_config(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    if let Some(show) = config.get_string("overlays", "show") {
        for name in show.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !OVERLAY_NAMES.contains(&name.to_lowercase().as_str()) {
                return Err(invalid(
                    "overlays",
                    "show",
                    format!("unknown overlay '{}', expected one of sma, ema, rsi, bollinger", name),
                ));
            }
        }
    }
    for key in ["sma_period", "ema_period", "rsi_period", "bollinger_period"] {
        validate_positive_int(config, "overlays", key)?;
    }
    if let Some(m) = parse_key::<f64>(
        config,
        "overlays",
        "bollinger_multiplier",
        "bollinger_multiplier must be a number",
    )? {
        if m <= 0.0 || !m.is_finite() {
            return Err(invalid(
                "overlays",
                "bollinger_multiplier",
                "bollinger_multiplier must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

/// Parse a date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, RulesimError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            section,
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

fn invalid(section: &str, key: &str, reason: String) -> RulesimError {
    RulesimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn parse_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, RulesimError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, reason.to_string())),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort, section: &str) -> Result<(), RulesimError> {
    let value = parse_key::<f64>(
        config,
        section,
        "initial_capital",
        "initial_capital must be a number",
    )?;
    match value {
        Some(v) if v <= 0.0 || !v.is_finite() => Err(invalid(
            section,
            "initial_capital",
            "initial_capital must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_max_trades(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    validate_positive_int(config, "backtest", "max_trades")
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), RulesimError> {
    let reason = format!("{} must be a positive integer", key);
    match parse_key::<u64>(config, section, key, &reason)? {
        Some(0) => Err(invalid(section, key, reason)),
        _ => Ok(()),
    }
}

fn validate_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), RulesimError> {
    match config.get_string(section, key) {
        None => Ok(()),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "false" | "no" | "0" => Ok(()),
            _ => Err(invalid(section, key, format!("{} must be true or false", key))),
        },
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    let start = match config.get_string("backtest", "start_date") {
        Some(s) => Some(parse_date(&s, "backtest", "start_date")?),
        None => None,
    };
    let end = match config.get_string("backtest", "end_date") {
        Some(s) => Some(parse_date(&s, "backtest", "end_date")?),
        None => None,
    };

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must not be after end_date".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), RulesimError> {
    match config.get_string("backtest", "data_path") {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "backtest",
            "data_path",
            "data_path must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}
