//! CSV file data adapter.
//!
//! Reads one `date,open,high,low,close,volume` file with a header row.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::candle::Candle;
use crate::domain::error::RulesimError;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn read_error(reason: String) -> RulesimError {
    RulesimError::DataRead { reason }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str, line: u64) -> Result<&'r str, RulesimError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| read_error(format!("line {}: missing {} column", line, name)))
}

fn number(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, RulesimError> {
    let raw = field(record, index, name, line)?;
    raw.parse()
        .map_err(|e| read_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Candle>, RulesimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            read_error(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| read_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = field(&record, 0, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                read_error(format!("line {}: invalid date '{}': {}", line, date_str, e))
            })?;

            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            let open = number(&record, 1, "open", line)?;
            if open <= 0.0 {
                debug!(%date, line, "skipping row without a positive open");
                continue;
            }

            candles.push(Candle {
                date,
                open,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        candles.sort_by_key(|c| c.date);
        let before = candles.len();
        candles.dedup_by_key(|c| c.date);
        if candles.len() < before {
            warn!(
                path = %self.path.display(),
                dropped = before - candles.len(),
                "duplicate dates in candle file; kept the first row for each"
            );
        }

        debug!(path = %self.path.display(), candles = candles.len(), "loaded candles");
        Ok(candles)
    }
}
