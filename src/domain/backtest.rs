//! Backtest configuration and the event-to-report pipeline.

use chrono::{NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::aggregate::{
    cumulative_return, self_financing_cumulative_return, CumulativeSeries, ReturnBasis,
};
use super::calendar::TradingCalendar;
use super::error::NewsalphaError;
use super::event::Event;
use super::random_benchmark::{BenchmarkAlignment, RandomBenchmark, RandomBenchmarkResult};
use super::returns::{AlignedEvent, ReturnEngine, ReturnRecord};
use super::session::{self, ResolvedSlot, SessionWindow};
use super::strategy::{apply_mode, StrategyMode};
use crate::ports::data_port::MarketDataPort;

/// Everything one backtest run needs. Built per call; no process-global
/// state, so runs with different parameters can coexist in one process.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub index_ticker: String,
    pub session: SessionWindow,
    /// Entry execution time-of-day; independent of `session.open`.
    pub entry_time: NaiveTime,
    /// Exit execution time-of-day; independent of `session.close`.
    pub exit_time: NaiveTime,
    pub mode: StrategyMode,
    pub exclude_neutral: bool,
    pub include_index: bool,
    pub benchmark_runs: usize,
    pub seed_offset: u64,
    pub alignment: BenchmarkAlignment,
}

/// Alignment outcome for one event feed.
#[derive(Debug, Clone, Default)]
pub struct EventAlignment {
    pub tradable: Vec<AlignedEvent>,
    pub inside_session: usize,
    pub past_calendar: usize,
}

/// Full comparison output: one series per strategy label, the random null
/// benchmark, and the alignment counters.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub strategies: Vec<(String, CumulativeSeries)>,
    pub random_benchmark: RandomBenchmarkResult,
    pub inside_session: usize,
    pub past_calendar: usize,
}

/// Trading calendar from the dates the benchmark index actually traded.
pub fn build_calendar(
    data: &dyn MarketDataPort,
    config: &BacktestConfig,
) -> Result<TradingCalendar, NewsalphaError> {
    let dates = data.trading_dates(&config.index_ticker, config.start_date, config.end_date)?;
    let calendar = TradingCalendar::from_dates(dates);
    if calendar.is_empty() {
        return Err(NewsalphaError::EmptyCalendar {
            ticker: config.index_ticker.clone(),
            start: config.start_date,
            end: config.end_date,
        });
    }
    Ok(calendar)
}

/// Resolve every event against the calendar, separating tradable slots from
/// inside-session noise and past-calendar leftovers.
pub fn align_events(
    events: &[Event],
    calendar: &TradingCalendar,
    config: &BacktestConfig,
) -> EventAlignment {
    let mut out = EventAlignment::default();
    for event in events {
        match session::resolve(event.event_time, config.session, calendar, config.entry_time) {
            ResolvedSlot::InsideSession => out.inside_session += 1,
            ResolvedSlot::Tradable(trade_time) => out.tradable.push(AlignedEvent {
                event: event.clone(),
                trade_time,
            }),
            ResolvedSlot::PastCalendarEnd => out.past_calendar += 1,
        }
    }
    out
}

/// Score one strategy mode over the aligned events.
pub fn run_strategy(
    engine: &ReturnEngine<'_>,
    aligned: &[AlignedEvent],
    mode: StrategyMode,
    exclude_neutral: bool,
    seed: u64,
) -> Result<Vec<ReturnRecord>, NewsalphaError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let overlaid = apply_mode(mode, aligned, &mut rng);
    engine.compute_all(&overlaid, exclude_neutral)
}

/// The configured mode plus the naive baselines, without duplicates.
fn comparison_modes(mode: StrategyMode) -> Vec<StrategyMode> {
    let mut modes = vec![mode];
    for baseline in [StrategyMode::AllLong, StrategyMode::AllShort] {
        if baseline != mode {
            modes.push(baseline);
        }
    }
    modes
}

fn series_for_mode(mode: StrategyMode, records: &[ReturnRecord]) -> CumulativeSeries {
    if mode.is_self_financing() {
        self_financing_cumulative_return(records)
    } else {
        cumulative_return(records, ReturnBasis::Excess)
    }
}

/// The full comparison: the configured strategy mode, the naive
/// always-long/always-short baselines, and the random null benchmark.
pub fn run_backtest(
    data: &dyn MarketDataPort,
    events: &[Event],
    config: &BacktestConfig,
) -> Result<BacktestReport, NewsalphaError> {
    let calendar = build_calendar(data, config)?;
    let alignment = align_events(events, &calendar, config);
    let engine = ReturnEngine::new(
        data,
        config.index_ticker.clone(),
        config.exit_time,
        config.include_index,
    );

    let modes = comparison_modes(config.mode);
    let mut strategies = Vec::with_capacity(modes.len());
    for mode in modes {
        let records = run_strategy(
            &engine,
            &alignment.tradable,
            mode,
            config.exclude_neutral,
            config.seed_offset,
        )?;
        strategies.push((mode.as_str().to_string(), series_for_mode(mode, &records)));
    }

    let benchmark = RandomBenchmark {
        runs: config.benchmark_runs,
        seed_offset: config.seed_offset,
        alignment: config.alignment,
    };
    let random_benchmark = benchmark.estimate(&engine, &alignment.tradable)?;

    Ok(BacktestReport {
        strategies,
        random_benchmark,
        inside_session: alignment.inside_session,
        past_calendar: alignment.past_calendar,
    })
}
