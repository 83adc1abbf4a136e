//! CSV event feed adapter.
//!
//! Expects a header of `ticker,event_time,signal[,metadata]`. Timestamps may
//! be ISO (`2024-01-15 21:30`) or the legacy feed format (`15.01.24 21:30`).

use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::NewsalphaError;
use crate::domain::event::{Event, Signal};
use crate::ports::event_port::EventFeedPort;

pub struct CsvEventAdapter {
    path: PathBuf,
}

fn parse_event_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%d.%m.%y %H:%M"))
        .ok()
}

impl CsvEventAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl EventFeedPort for CsvEventAdapter {
    fn load_events(&self) -> Result<Vec<Event>, NewsalphaError> {
        let content = fs::read_to_string(&self.path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut events = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            // Header is row 1.
            let row = i + 2;
            let record = result.map_err(|e| NewsalphaError::InvalidEvent {
                row,
                reason: e.to_string(),
            })?;

            let ticker = record
                .get(0)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| NewsalphaError::InvalidEvent {
                    row,
                    reason: "empty ticker".to_string(),
                })?
                .to_string();

            let time_str = record.get(1).unwrap_or_default().trim();
            let event_time =
                parse_event_time(time_str).ok_or_else(|| NewsalphaError::InvalidEvent {
                    row,
                    reason: format!("unparseable event_time {time_str:?}"),
                })?;

            let signal_str = record.get(2).unwrap_or_default().trim();
            let signal = signal_str
                .parse::<i64>()
                .ok()
                .and_then(Signal::from_int)
                .ok_or_else(|| NewsalphaError::InvalidEvent {
                    row,
                    reason: format!("signal must be -1, 0 or 1, got {signal_str:?}"),
                })?;

            let metadata = record.get(3).unwrap_or_default().to_string();

            events.push(Event {
                ticker,
                event_time,
                signal,
                metadata,
            });
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn adapter_for(content: &str) -> (NamedTempFile, CsvEventAdapter) {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        let adapter = CsvEventAdapter::new(file.path().to_path_buf());
        (file, adapter)
    }

    #[test]
    fn loads_events_with_metadata() {
        let (_file, adapter) = adapter_for(
            "ticker,event_time,signal,metadata\n\
             GAZP,2024-01-15 21:30,1,dividend hike announced\n\
             SBER,2024-01-16 08:12,-1,\n",
        );
        let events = adapter.load_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ticker, "GAZP");
        assert_eq!(events[0].signal, Signal::Long);
        assert_eq!(events[0].metadata, "dividend hike announced");
        assert_eq!(
            events[0].event_time,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap()
        );
        assert_eq!(events[1].signal, Signal::Short);
    }

    #[test]
    fn accepts_the_legacy_timestamp_format() {
        let (_file, adapter) = adapter_for(
            "ticker,event_time,signal\n\
             LKOH,15.01.24 21:30,0\n",
        );
        let events = adapter.load_events().unwrap();
        assert_eq!(events[0].signal, Signal::Neutral);
        assert_eq!(
            events[0].event_time,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_signal_with_row_context() {
        let (_file, adapter) = adapter_for(
            "ticker,event_time,signal\n\
             GAZP,2024-01-15 21:30,1\n\
             SBER,2024-01-16 08:12,2\n",
        );
        match adapter.load_events() {
            Err(NewsalphaError::InvalidEvent { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected InvalidEvent, got: {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_timestamps() {
        let (_file, adapter) = adapter_for(
            "ticker,event_time,signal\n\
             GAZP,monday evening,1\n",
        );
        assert!(matches!(
            adapter.load_events(),
            Err(NewsalphaError::InvalidEvent { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_empty_ticker() {
        let (_file, adapter) = adapter_for(
            "ticker,event_time,signal\n\
             ,2024-01-15 21:30,1\n",
        );
        assert!(matches!(
            adapter.load_events(),
            Err(NewsalphaError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let adapter = CsvEventAdapter::new(PathBuf::from("/nonexistent/events.csv"));
        assert!(matches!(
            adapter.load_events(),
            Err(NewsalphaError::Io(_))
        ));
    }
}
