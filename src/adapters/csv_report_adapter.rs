//! CSV report adapter.
//!
//! Writes three files into the output directory:
//! - `trades.csv`: one row per trade, with the triggering rule described
//! - `equity.csv`: the mark-to-market equity curve
//! - `overlays.csv`: long-format indicator overlays (`name,color,date,value`)

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RulesimError;
use crate::domain::overlay::IndicatorOverlay;
use crate::domain::trade::TradeStatus;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";
pub const OVERLAYS_FILE: &str = "overlays.csv";

pub struct CsvReportAdapter;

fn csv_error(err: csv::Error) -> RulesimError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => RulesimError::Io(io),
        other => RulesimError::Io(std::io::Error::other(format!("{:?}", other))),
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), RulesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
    wtr.write_record([
        "entry_date",
        "entry_price",
        "quantity",
        "status",
        "exit_date",
        "exit_price",
        "pnl",
        "rule_id",
        "rule",
    ])
    .map_err(csv_error)?;

    for trade in &result.trades {
        let status = match trade.status {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        };
        let rule = result.rule_for(trade).map(|r| r.to_string()).unwrap_or_default();
        wtr.write_record([
            trade.entry_date.to_string(),
            format!("{:.2}", trade.entry_price),
            trade.quantity.to_string(),
            status.to_string(),
            opt(trade.exit_date),
            opt(trade.exit_price.map(|p| format!("{:.2}", p))),
            opt(trade.pnl.map(|p| format!("{:.2}", p))),
            trade.rule_id.clone(),
            rule,
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_equity(result: &BacktestResult, path: &Path) -> Result<(), RulesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
    wtr.write_record(["date", "equity"]).map_err(csv_error)?;
    for point in &result.equity_curve {
        wtr.write_record([point.date.to_string(), format!("{:.2}", point.equity)])
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_overlays<'a>(
    overlays: impl Iterator<Item = &'a IndicatorOverlay>,
    path: &Path,
) -> Result<(), RulesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
    wtr.write_record(["name", "color", "date", "value"])
        .map_err(csv_error)?;
    for overlay in overlays {
        for point in &overlay.points {
            wtr.write_record([
                overlay.name.clone(),
                overlay.color.to_string(),
                point.date.to_string(),
                format!("{:.4}", point.value),
            ])
            .map_err(csv_error)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        chart_overlays: &[IndicatorOverlay],
        output_dir: &Path,
    ) -> Result<(), RulesimError> {
        fs::create_dir_all(output_dir)?;
        write_trades(result, &output_dir.join(TRADES_FILE))?;
        write_equity(result, &output_dir.join(EQUITY_FILE))?;
        write_overlays(
            result.overlays.iter().chain(chart_overlays),
            &output_dir.join(OVERLAYS_FILE),
        )?;
        tracing::info!(dir = %output_dir.display(), "report written");
        Ok(())
    }
}
