//! Daily price bars.

use chrono::NaiveDate;

/// One open/close observation for a ticker on one day. Adapters that hold
/// intraday rows collapse them to the earliest open and latest close inside
/// the requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

/// Entry/exit prices over a lookup window: the first bar's open and the last
/// bar's close. `None` when the window holds no bars.
pub fn window_prices(bars: &[PriceBar]) -> Option<(f64, f64)> {
    let first = bars.first()?;
    let last = bars.last()?;
    Some((first.open, last.close))
}
