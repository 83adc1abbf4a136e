//! Trading calendar: the set of dates the reference market was open.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Immutable ordered set of trading dates, built once per run and queried
/// during event alignment.
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    days: BTreeSet<NaiveDate>,
}

impl TradingCalendar {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            days: dates.into_iter().collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// Earliest trading day at or after `date`, if any remains in the
    /// calendar range.
    pub fn next_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.days.range(date..).next().copied()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.iter().next().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.iter().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
