//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RulesimError;
use crate::domain::overlay::IndicatorOverlay;

/// Port for writing backtest reports.
pub trait ReportPort {
    /// Write `result` into `output_dir`, with any extra chart overlays.
    fn write(
        &self,
        result: &BacktestResult,
        chart_overlays: &[IndicatorOverlay],
        output_dir: &Path,
    ) -> Result<(), RulesimError>;
}
