//! SQLite market data adapter.
//!
//! Reads the `ticker_data` table written by the companion market-data
//! loader: one row per intraday candle, keyed by ticker and datetime text.

use chrono::{NaiveDate, NaiveDateTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use super::csv_market_data::collapse_daily;
use crate::domain::bar::PriceBar;
use crate::domain::error::NewsalphaError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteMarketDataAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteMarketDataAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, NewsalphaError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| NewsalphaError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, NewsalphaError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), NewsalphaError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ticker_data (
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                close REAL NOT NULL,
                PRIMARY KEY (ticker, date)
            );
            CREATE INDEX IF NOT EXISTS idx_ticker_data_ticker ON ticker_data(ticker);",
        )
        .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Insert intraday quotes for one ticker; used by tests and the loader.
    pub fn insert_quotes(
        &self,
        ticker: &str,
        quotes: &[(NaiveDateTime, f64, f64)],
    ) -> Result<(), NewsalphaError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for (timestamp, open, close) in quotes {
            tx.execute(
                "INSERT OR REPLACE INTO ticker_data (ticker, date, open, close)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    ticker,
                    timestamp.format(DATETIME_FORMAT).to_string(),
                    open,
                    close
                ],
            )
            .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

impl MarketDataPort for SqliteMarketDataAdapter {
    fn fetch_window(
        &self,
        ticker: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, NewsalphaError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT date, open, close FROM ticker_data
                     WHERE ticker = ?1 AND date BETWEEN ?2 AND ?3
                     ORDER BY date ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(
                params![
                    ticker,
                    start.format(DATETIME_FORMAT).to_string(),
                    end.format(DATETIME_FORMAT).to_string()
                ],
                |row| {
                    let date_str: String = row.get(0)?;
                    let timestamp = NaiveDateTime::parse_from_str(&date_str, DATETIME_FORMAT)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                date_str.len(),
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?;
                    Ok((timestamp, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
                },
            )
            .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut quotes = Vec::new();
        for row in rows {
            quotes.push(
                row.map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(collapse_daily(&quotes))
    }

    fn trading_dates(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, NewsalphaError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| NewsalphaError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT DISTINCT substr(date, 1, 10) FROM ticker_data
                     WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                     ORDER BY 1 ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(
                params![
                    ticker,
                    format!("{start} 00:00:00"),
                    format!("{end} 23:59:59")
                ],
                |row| {
                    let date_str: String = row.get(0)?;
                    NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            date_str.len(),
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })
                },
            )
            .map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut dates = Vec::new();
        for row in rows {
            dates.push(
                row.map_err(|e: rusqlite::Error| NewsalphaError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(dates)
    }
}
