//! Configuration validation.
//!
//! Validates the INI surface before a run touches any data.

use chrono::NaiveDate;

use super::error::NewsalphaError;
use super::session::parse_time_of_day;
use super::strategy::StrategyMode;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    validate_dates(config)?;
    validate_index_ticker(config)?;
    validate_session_times(config)?;
    validate_execution_times(config)?;
    validate_strategy_mode(config)?;
    validate_benchmark(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> NewsalphaError {
    NewsalphaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_date(value: Option<&str>, key: &str) -> Result<NaiveDate, NewsalphaError> {
    match value {
        None => Err(NewsalphaError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| invalid("backtest", key, format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    if start >= end {
        return Err(invalid("backtest", "start_date", "start_date must be before end_date"));
    }
    Ok(())
}

fn validate_index_ticker(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    if let Some(ticker) = config.get_string("backtest", "index_ticker") {
        if ticker.trim().is_empty() {
            return Err(invalid("backtest", "index_ticker", "index_ticker must not be empty"));
        }
    }
    Ok(())
}

fn require_time(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<chrono::NaiveTime>, NewsalphaError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => parse_time_of_day(&s)
            .map(Some)
            .ok_or_else(|| invalid(section, key, "invalid time, expected HH:MM or HH:MM:SS")),
    }
}

fn validate_session_times(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    let open = require_time(config, "session", "open")?;
    let close = require_time(config, "session", "close")?;
    if let (Some(open), Some(close)) = (open, close) {
        if open >= close {
            return Err(invalid("session", "open", "session open must be before close"));
        }
    }
    Ok(())
}

fn validate_execution_times(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    let entry = require_time(config, "session", "entry")?;
    let exit = require_time(config, "session", "exit")?;
    if let (Some(entry), Some(exit)) = (entry, exit) {
        if entry >= exit {
            return Err(invalid("session", "entry", "entry execution must precede exit execution"));
        }
    }
    Ok(())
}

fn validate_strategy_mode(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    if let Some(mode) = config.get_string("backtest", "strategy") {
        mode.parse::<StrategyMode>()?;
    }
    Ok(())
}

fn validate_benchmark(config: &dyn ConfigPort) -> Result<(), NewsalphaError> {
    let runs = config.get_int("benchmark", "runs", 100);
    if runs < 1 {
        return Err(invalid("benchmark", "runs", "runs must be at least 1"));
    }
    let seed_offset = config.get_int("benchmark", "seed_offset", 0);
    if seed_offset < 0 {
        return Err(invalid("benchmark", "seed_offset", "seed_offset must be non-negative"));
    }
    if let Some(alignment) = config.get_string("benchmark", "alignment") {
        match alignment.as_str() {
            "sparse" | "fill_forward" => {}
            _ => {
                return Err(invalid(
                    "benchmark",
                    "alignment",
                    "alignment must be sparse or fill_forward",
                ));
            }
        }
    }
    Ok(())
}
