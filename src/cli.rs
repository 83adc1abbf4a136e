//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::csv_event_adapter::CsvEventAdapter;
use crate::adapters::csv_market_data::CsvMarketDataAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self, BacktestConfig};
use crate::domain::config_validation::validate_backtest_config;
use crate::domain::error::NewsalphaError;
use crate::domain::random_benchmark::{BenchmarkAlignment, RandomBenchmark};
use crate::domain::returns::ReturnEngine;
use crate::domain::session::{parse_time_of_day, SessionWindow};
use crate::domain::strategy::StrategyMode;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::event_port::EventFeedPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "newsalpha", about = "News-event excess-return backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy comparison and the random benchmark
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Event feed CSV; overrides [data] events_path
        #[arg(short, long)]
        events: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Strategy mode override (default, all_long, all_short, random,
        /// gpt_long, gpt_short)
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Run only the random-signal null benchmark
    Benchmark {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        events: Option<PathBuf>,
        #[arg(long)]
        runs: Option<usize>,
        #[arg(long)]
        seed_offset: Option<u64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            events,
            output,
            strategy,
            dry_run,
        } => run_backtest(
            &config,
            events.as_ref(),
            output.as_ref(),
            strategy.as_deref(),
            dry_run,
        ),
        Command::Benchmark {
            config,
            events,
            runs,
            seed_offset,
        } => run_benchmark(&config, events.as_ref(), runs, seed_offset),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = NewsalphaError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn required_date(adapter: &dyn ConfigPort, key: &str) -> Result<NaiveDate, NewsalphaError> {
    let value = adapter
        .get_string("backtest", key)
        .ok_or_else(|| NewsalphaError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| NewsalphaError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

fn time_or_default(
    adapter: &dyn ConfigPort,
    key: &str,
    default: &str,
) -> Result<chrono::NaiveTime, NewsalphaError> {
    let value = adapter
        .get_string("session", key)
        .unwrap_or_else(|| default.to_string());
    parse_time_of_day(&value).ok_or_else(|| NewsalphaError::ConfigInvalid {
        section: "session".into(),
        key: key.into(),
        reason: "invalid time, expected HH:MM or HH:MM:SS".into(),
    })
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    mode_override: Option<&str>,
) -> Result<BacktestConfig, NewsalphaError> {
    let mode_str = match mode_override {
        Some(m) => m.to_string(),
        None => adapter
            .get_string("backtest", "strategy")
            .unwrap_or_else(|| "default".to_string()),
    };
    let mode = StrategyMode::from_str(&mode_str)?;

    let alignment = match adapter
        .get_string("benchmark", "alignment")
        .unwrap_or_else(|| "sparse".to_string())
        .as_str()
    {
        "sparse" => BenchmarkAlignment::SparseMean,
        "fill_forward" => BenchmarkAlignment::FillForward,
        other => {
            return Err(NewsalphaError::ConfigInvalid {
                section: "benchmark".into(),
                key: "alignment".into(),
                reason: format!("unknown alignment {other:?}"),
            });
        }
    };

    Ok(BacktestConfig {
        start_date: required_date(adapter, "start_date")?,
        end_date: required_date(adapter, "end_date")?,
        index_ticker: adapter
            .get_string("backtest", "index_ticker")
            .unwrap_or_else(|| "IMOEX".to_string()),
        session: SessionWindow {
            open: time_or_default(adapter, "open", "09:51")?,
            close: time_or_default(adapter, "close", "18:49")?,
        },
        entry_time: time_or_default(adapter, "entry", "10:01")?,
        exit_time: time_or_default(adapter, "exit", "18:39")?,
        mode,
        exclude_neutral: adapter.get_bool("backtest", "exclude_neutral", true),
        include_index: adapter.get_bool("backtest", "include_index", true),
        benchmark_runs: adapter.get_int("benchmark", "runs", 100) as usize,
        seed_offset: adapter.get_int("benchmark", "seed_offset", 0) as u64,
        alignment,
    })
}

pub fn resolve_events_path(
    events_override: Option<&PathBuf>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, NewsalphaError> {
    if let Some(path) = events_override {
        return Ok(path.clone());
    }
    adapter
        .get_string("data", "events_path")
        .map(PathBuf::from)
        .ok_or_else(|| NewsalphaError::ConfigMissing {
            section: "data".into(),
            key: "events_path".into(),
        })
}

fn make_data_port(adapter: &FileConfigAdapter) -> Result<Box<dyn MarketDataPort>, NewsalphaError> {
    #[cfg(feature = "sqlite")]
    if adapter.get_string("sqlite", "path").is_some() {
        use crate::adapters::sqlite_adapter::SqliteMarketDataAdapter;
        return Ok(Box::new(SqliteMarketDataAdapter::from_config(adapter)?));
    }

    let bars_dir =
        adapter
            .get_string("data", "bars_dir")
            .ok_or_else(|| NewsalphaError::ConfigMissing {
                section: "data".into(),
                key: "bars_dir".into(),
            })?;
    Ok(Box::new(CsvMarketDataAdapter::new(PathBuf::from(bars_dir))))
}

struct RunSetup {
    config: BacktestConfig,
    events: Vec<crate::domain::event::Event>,
    data_port: Box<dyn MarketDataPort>,
}

fn prepare_run(
    config_path: &PathBuf,
    events_override: Option<&PathBuf>,
    mode_override: Option<&str>,
) -> Result<RunSetup, ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }

    let config = match build_backtest_config(&adapter, mode_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    let events_path = match resolve_events_path(events_override, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    eprintln!("Loading events from {}", events_path.display());
    let events = match CsvEventAdapter::new(events_path).load_events() {
        Ok(events) => events,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };
    eprintln!("  {} events", events.len());

    let data_port = match make_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return Err((&e).into());
        }
    };

    Ok(RunSetup {
        config,
        events,
        data_port,
    })
}

fn print_metrics(label: &str, metrics: &crate::domain::aggregate::RiskMetrics) {
    eprintln!("  {label}:");
    eprintln!("    Sharpe (annualized):  {:.2}", metrics.sharpe);
    eprintln!("    Mean daily return:    {:.3}%", metrics.mean_daily_pct);
    eprintln!("    Std deviation:        {:.3}%", metrics.std_daily_pct);
    eprintln!("    Max drawdown:         {:.2}%", metrics.max_drawdown_pct);
}

fn run_backtest(
    config_path: &PathBuf,
    events_override: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
    mode_override: Option<&str>,
    dry_run: bool,
) -> ExitCode {
    if dry_run {
        return run_dry_run(config_path, mode_override);
    }

    let setup = match prepare_run(config_path, events_override, mode_override) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!(
        "Running backtest: {} to {}, index {}, strategy {}",
        setup.config.start_date, setup.config.end_date, setup.config.index_ticker, setup.config.mode,
    );

    let report = match backtest::run_backtest(setup.data_port.as_ref(), &setup.events, &setup.config)
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "  {} events inside session hours, {} past calendar end",
        report.inside_session, report.past_calendar
    );

    eprintln!("\n=== Strategy Comparison ===");
    for (label, series) in &report.strategies {
        print_metrics(label, &series.metrics);
    }
    print_metrics("expected_random", &report.random_benchmark.metrics);

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("report.csv"));

    match CsvReportAdapter.write(&report, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_benchmark(
    config_path: &PathBuf,
    events_override: Option<&PathBuf>,
    runs_override: Option<usize>,
    seed_override: Option<u64>,
) -> ExitCode {
    let setup = match prepare_run(config_path, events_override, None) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let config = setup.config;
    let runs = runs_override.unwrap_or(config.benchmark_runs);
    let seed_offset = seed_override.unwrap_or(config.seed_offset);

    let calendar = match backtest::build_calendar(setup.data_port.as_ref(), &config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} trading days in calendar", calendar.len());

    let alignment = backtest::align_events(&setup.events, &calendar, &config);
    eprintln!(
        "  {} tradable events ({} inside session, {} past calendar end)",
        alignment.tradable.len(),
        alignment.inside_session,
        alignment.past_calendar
    );

    let engine = ReturnEngine::new(
        setup.data_port.as_ref(),
        config.index_ticker.clone(),
        config.exit_time,
        config.include_index,
    );

    let benchmark = RandomBenchmark {
        runs,
        seed_offset,
        alignment: config.alignment,
    };

    eprintln!("Running {runs} random-signal simulations (seed offset {seed_offset})");
    let result = match benchmark.estimate(&engine, &alignment.tradable) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Expected Random Strategy ===");
    print_metrics("expected_random", &result.metrics);
    if let Some((date, cumulative)) = result.curve.last() {
        eprintln!("  Final expected cumulative return: {cumulative:.4} on {date}");
    }
    ExitCode::SUCCESS
}

fn run_dry_run(config_path: &PathBuf, mode_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match build_backtest_config(&adapter, mode_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nBacktest configuration:");
    eprintln!("  dates:     {} to {}", config.start_date, config.end_date);
    eprintln!("  index:     {}", config.index_ticker);
    eprintln!(
        "  session:   {} - {} (entry {}, exit {})",
        config.session.open, config.session.close, config.entry_time, config.exit_time
    );
    eprintln!("  strategy:  {}", config.mode);
    eprintln!(
        "  benchmark: {} runs, seed offset {}",
        config.benchmark_runs, config.seed_offset
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_backtest_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
