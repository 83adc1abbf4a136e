//! CSV market data adapter.
//!
//! One file per ticker (`<TICKER>.csv`) with `datetime,open,close` rows at
//! any intraday granularity. Rows inside a lookup window are collapsed to
//! one bar per date: earliest open, latest close.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::bar::PriceBar;
use crate::domain::error::NewsalphaError;
use crate::ports::data_port::MarketDataPort;

pub struct CsvMarketDataAdapter {
    base_path: PathBuf,
}

fn parse_row_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

impl CsvMarketDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    /// Raw `(timestamp, open, close)` rows for a ticker. A missing file is
    /// no data, not an error: unknown tickers drop their events.
    fn read_rows(&self, ticker: &str) -> Result<Vec<(NaiveDateTime, f64, f64)>, NewsalphaError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(NewsalphaError::Database {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| NewsalphaError::Database {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let timestamp_str = record.get(0).ok_or_else(|| NewsalphaError::Database {
                reason: format!("missing datetime column in {}", path.display()),
            })?;
            let timestamp =
                parse_row_datetime(timestamp_str).ok_or_else(|| NewsalphaError::Database {
                    reason: format!("invalid datetime {timestamp_str:?} in {}", path.display()),
                })?;

            let open: f64 = record
                .get(1)
                .ok_or_else(|| NewsalphaError::Database {
                    reason: format!("missing open column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| NewsalphaError::Database {
                    reason: format!("invalid open value in {}: {}", path.display(), e),
                })?;

            let close: f64 = record
                .get(2)
                .ok_or_else(|| NewsalphaError::Database {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| NewsalphaError::Database {
                    reason: format!("invalid close value in {}: {}", path.display(), e),
                })?;

            rows.push((timestamp, open, close));
        }

        rows.sort_by_key(|(timestamp, _, _)| *timestamp);
        Ok(rows)
    }
}

/// Collapse timestamp-sorted rows to one bar per date: earliest open,
/// latest close.
pub fn collapse_daily(rows: &[(NaiveDateTime, f64, f64)]) -> Vec<PriceBar> {
    let mut daily: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for (timestamp, open, close) in rows {
        daily
            .entry(timestamp.date())
            .and_modify(|(_, last_close)| *last_close = *close)
            .or_insert((*open, *close));
    }
    daily
        .into_iter()
        .map(|(date, (open, close))| PriceBar { date, open, close })
        .collect()
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn fetch_window(
        &self,
        ticker: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, NewsalphaError> {
        let rows = self.read_rows(ticker)?;
        let in_window: Vec<_> = rows
            .into_iter()
            .filter(|(timestamp, _, _)| *timestamp >= start && *timestamp <= end)
            .collect();
        Ok(collapse_daily(&in_window))
    }

    fn trading_dates(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, NewsalphaError> {
        let rows = self.read_rows(ticker)?;
        let mut dates: Vec<NaiveDate> = rows
            .into_iter()
            .map(|(timestamp, _, _)| timestamp.date())
            .filter(|date| *date >= start && *date <= end)
            .collect();
        dates.dedup();
        Ok(dates)
    }
}
