//! Market data access port.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::bar::PriceBar;
use crate::domain::error::NewsalphaError;

pub trait MarketDataPort {
    /// Daily bars for `ticker` inside `[start, end]`, ascending by date, one
    /// bar per date carrying the earliest open and latest close within the
    /// window. Empty when the ticker has no data there.
    fn fetch_window(
        &self,
        ticker: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, NewsalphaError>;

    /// Ascending dates on which `ticker` has bars; the trading calendar is
    /// built from the benchmark index's own dates.
    fn trading_dates(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, NewsalphaError>;
}
