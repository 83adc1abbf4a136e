#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use newsalpha::domain::backtest::BacktestConfig;
use newsalpha::domain::bar::PriceBar;
use newsalpha::domain::error::NewsalphaError;
use newsalpha::domain::event::{Event, Signal};
use newsalpha::domain::random_benchmark::BenchmarkAlignment;
use newsalpha::domain::session::SessionWindow;
use newsalpha::domain::strategy::StrategyMode;
use newsalpha::ports::data_port::MarketDataPort;
use std::collections::HashMap;

pub struct MockMarketDataPort {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bar(mut self, ticker: &str, date: &str, open: f64, close: f64) -> Self {
        self.bars
            .entry(ticker.to_string())
            .or_default()
            .push(PriceBar {
                date: parse_date(date),
                open,
                close,
            });
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_window(
        &self,
        ticker: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, NewsalphaError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(NewsalphaError::Database {
                reason: reason.clone(),
            });
        }
        let mut bars: Vec<PriceBar> = self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start.date() && b.date <= end.date())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn trading_dates(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, NewsalphaError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(NewsalphaError::Database {
                reason: reason.clone(),
            });
        }
        let mut dates: Vec<NaiveDate> = self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .map(|b| b.date)
                    .filter(|d| *d >= start && *d <= end)
                    .collect()
            })
            .unwrap_or_default();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }
}

pub fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(date_str: &str, h: u32, min: u32) -> NaiveDateTime {
    parse_date(date_str).and_hms_opt(h, min, 0).unwrap()
}

pub fn make_event(ticker: &str, event_time: NaiveDateTime, signal: Signal) -> Event {
    Event {
        ticker: ticker.to_string(),
        event_time,
        signal,
        metadata: format!("{ticker} headline"),
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: date(2024, 1, 15),
        end_date: date(2024, 1, 31),
        index_ticker: "IMOEX".to_string(),
        session: SessionWindow {
            open: NaiveTime::from_hms_opt(9, 51, 0).unwrap(),
            close: NaiveTime::from_hms_opt(18, 49, 0).unwrap(),
        },
        entry_time: NaiveTime::from_hms_opt(10, 1, 0).unwrap(),
        exit_time: NaiveTime::from_hms_opt(18, 39, 0).unwrap(),
        mode: StrategyMode::Default,
        exclude_neutral: true,
        include_index: true,
        benchmark_runs: 5,
        seed_offset: 0,
        alignment: BenchmarkAlignment::SparseMean,
    }
}

/// Mock data for 2024-01-15..19 plus 22: the index trades every weekday and
/// two tickers move against it.
pub fn weekday_market() -> MockMarketDataPort {
    let mut port = MockMarketDataPort::new();
    for (i, day) in ["2024-01-15", "2024-01-16", "2024-01-17", "2024-01-18", "2024-01-19", "2024-01-22"]
        .iter()
        .enumerate()
    {
        let base = 1000.0 + i as f64 * 10.0;
        port = port.with_bar("IMOEX", day, base, base + 5.0);
        port = port.with_bar("GAZP", day, 100.0 + i as f64, 102.0 + i as f64);
        port = port.with_bar("SBER", day, 250.0 + i as f64, 248.0 + i as f64);
    }
    port
}
