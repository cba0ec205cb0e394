//! Candle data access port trait.

use chrono::NaiveDate;

use crate::domain::candle::Candle;
use crate::domain::error::RulesimError;

pub trait DataPort {
    /// Candles dated within `[start, end]`, date-ascending. Either bound may
    /// be open.
    fn fetch_candles(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Candle>, RulesimError>;
}
