//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for newsalpha.
#[derive(Debug, thiserror::Error)]
pub enum NewsalphaError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy mode: {0}")]
    UnknownStrategyMode(String),

    #[error("invalid event row {row}: {reason}")]
    InvalidEvent { row: usize, reason: String },

    #[error("no trading days for {ticker} between {start} and {end}")]
    EmptyCalendar {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&NewsalphaError> for std::process::ExitCode {
    fn from(err: &NewsalphaError) -> Self {
        let code: u8 = match err {
            NewsalphaError::Io(_) => 1,
            NewsalphaError::ConfigParse { .. }
            | NewsalphaError::ConfigMissing { .. }
            | NewsalphaError::ConfigInvalid { .. } => 2,
            NewsalphaError::Database { .. } | NewsalphaError::DatabaseQuery { .. } => 3,
            NewsalphaError::UnknownStrategyMode(_) | NewsalphaError::InvalidEvent { .. } => 4,
            NewsalphaError::EmptyCalendar { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
