//! News event records and directional signals.

use chrono::NaiveDateTime;

/// Expected price direction attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    Neutral,
    Short,
}

impl Signal {
    /// Integer form used by event feeds: +1 long, 0 neutral, -1 short.
    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            1 => Some(Signal::Long),
            0 => Some(Signal::Neutral),
            -1 => Some(Signal::Short),
            _ => None,
        }
    }

    pub fn as_int(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Neutral => 0,
            Signal::Short => -1,
        }
    }

    /// Payoff direction for return computation: +1 for long entries, -1 for
    /// the short-style payoff applied to every non-long case.
    pub fn payoff_sign(self) -> f64 {
        match self {
            Signal::Long => 1.0,
            Signal::Neutral | Signal::Short => -1.0,
        }
    }
}

/// One news-derived record. `metadata` is an opaque payload (headline, model
/// explanation) carried through to the output unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub ticker: String,
    pub event_time: NaiveDateTime,
    pub signal: Signal,
    pub metadata: String,
}
