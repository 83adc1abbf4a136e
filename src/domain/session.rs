//! Session cutoffs and event-to-trading-window alignment.

use chrono::{Days, NaiveDateTime, NaiveTime};

use super::calendar::TradingCalendar;

/// Fixed intraday session boundaries, constant across all sessions. An event
/// with a time-of-day inside `[open, close]` happened during live trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl SessionWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time <= self.close
    }
}

/// Outcome of aligning an event timestamp to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSlot {
    /// Event landed during live trading; excluded from close-to-close
    /// scoring.
    InsideSession,
    /// Entry timestamp on a valid trading day.
    Tradable(NaiveDateTime),
    /// Candidate date falls after the last calendar date; the event cannot
    /// be traded and is dropped by the pipeline.
    PastCalendarEnd,
}

/// Snap an event timestamp to its tradable slot.
///
/// Before the session open the candidate trade date is the event's own date;
/// after the close it is the next date. A candidate that is not a trading
/// day advances to the earliest calendar date at or after it. The resulting
/// slot carries `entry_time`, the configured entry execution time-of-day,
/// which is independent of the session-open cutoff.
pub fn resolve(
    event_time: NaiveDateTime,
    session: SessionWindow,
    calendar: &TradingCalendar,
    entry_time: NaiveTime,
) -> ResolvedSlot {
    let time = event_time.time();
    if session.contains(time) {
        return ResolvedSlot::InsideSession;
    }

    let candidate = if time < session.open {
        Some(event_time.date())
    } else {
        event_time.date().checked_add_days(Days::new(1))
    };

    match candidate.and_then(|date| calendar.next_on_or_after(date)) {
        Some(date) => ResolvedSlot::Tradable(date.and_time(entry_time)),
        None => ResolvedSlot::PastCalendarEnd,
    }
}

/// Parse a time-of-day config value, with or without seconds.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session() -> SessionWindow {
        SessionWindow {
            open: time(9, 51),
            close: time(18, 49),
        }
    }

    fn entry() -> NaiveTime {
        time(10, 1)
    }

    // Mon 15th .. Fri 19th, weekend closed, Mon 22nd.
    fn calendar() -> TradingCalendar {
        TradingCalendar::from_dates([
            date(2024, 1, 15),
            date(2024, 1, 16),
            date(2024, 1, 17),
            date(2024, 1, 18),
            date(2024, 1, 19),
            date(2024, 1, 22),
        ])
    }

    #[test]
    fn inside_session_is_sentinel() {
        let slot = resolve(
            date(2024, 1, 16).and_time(time(12, 30)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::InsideSession);
    }

    #[test]
    fn session_boundaries_are_inclusive() {
        let cal = calendar();
        let open_edge = resolve(date(2024, 1, 16).and_time(time(9, 51)), session(), &cal, entry());
        let close_edge = resolve(date(2024, 1, 16).and_time(time(18, 49)), session(), &cal, entry());
        assert_eq!(open_edge, ResolvedSlot::InsideSession);
        assert_eq!(close_edge, ResolvedSlot::InsideSession);
    }

    #[test]
    fn before_open_trades_same_day() {
        let slot = resolve(
            date(2024, 1, 16).and_time(time(8, 0)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::Tradable(date(2024, 1, 16).and_time(entry())));
    }

    #[test]
    fn after_close_trades_next_day() {
        let slot = resolve(
            date(2024, 1, 16).and_time(time(20, 15)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::Tradable(date(2024, 1, 17).and_time(entry())));
    }

    #[test]
    fn after_close_friday_skips_to_monday() {
        let slot = resolve(
            date(2024, 1, 19).and_time(time(19, 0)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::Tradable(date(2024, 1, 22).and_time(entry())));
    }

    #[test]
    fn weekend_event_advances_to_next_trading_day() {
        let slot = resolve(
            date(2024, 1, 20).and_time(time(11, 0)),
            session(),
            &calendar(),
            entry(),
        );
        // Saturday 11:00 is inside session hours but pricing happens on the
        // next trading day only when the date itself is closed; the session
        // check is purely time-of-day, so this is the sentinel.
        assert_eq!(slot, ResolvedSlot::InsideSession);

        let slot = resolve(
            date(2024, 1, 20).and_time(time(7, 0)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::Tradable(date(2024, 1, 22).and_time(entry())));
    }

    #[test]
    fn past_calendar_end_is_reported() {
        let slot = resolve(
            date(2024, 1, 22).and_time(time(19, 0)),
            session(),
            &calendar(),
            entry(),
        );
        assert_eq!(slot, ResolvedSlot::PastCalendarEnd);
    }

    #[test]
    fn entry_time_is_independent_of_session_open() {
        let late_entry = time(10, 30);
        let slot = resolve(
            date(2024, 1, 16).and_time(time(8, 0)),
            session(),
            &calendar(),
            late_entry,
        );
        assert_eq!(slot, ResolvedSlot::Tradable(date(2024, 1, 16).and_time(late_entry)));
    }

    #[test]
    fn parse_time_of_day_formats() {
        assert_eq!(parse_time_of_day("09:51:00"), Some(time(9, 51)));
        assert_eq!(parse_time_of_day("10:01"), Some(time(10, 1)));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("not a time"), None);
    }

    proptest! {
        #[test]
        fn resolved_slots_never_precede_the_event(hour in 0u32..24, minute in 0u32..60, day in 15u32..23) {
            let event_time = date(2024, 1, day).and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
            let cal = calendar();
            match resolve(event_time, session(), &cal, entry()) {
                ResolvedSlot::InsideSession => {
                    prop_assert!(session().contains(event_time.time()));
                }
                ResolvedSlot::Tradable(t) => {
                    prop_assert!(cal.contains(t.date()));
                    prop_assert!(t.date() >= event_time.date());
                    prop_assert_eq!(t.time(), entry());
                }
                ResolvedSlot::PastCalendarEnd => {
                    prop_assert!(event_time.time() > session().close || !cal.contains(event_time.date()));
                }
            }
        }

        #[test]
        fn before_open_on_trading_day_keeps_the_date(minute in 0u32..(9 * 60 + 51)) {
            let t = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap();
            let event_time = date(2024, 1, 17).and_time(t);
            match resolve(event_time, session(), &calendar(), entry()) {
                ResolvedSlot::Tradable(slot) => prop_assert_eq!(slot.date(), date(2024, 1, 17)),
                other => prop_assert!(false, "expected Tradable, got {:?}", other),
            }
        }
    }
}
