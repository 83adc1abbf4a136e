//! CSV report adapter.
//!
//! Writes the comparison in two files for the plotting collaborator:
//! `<output>` holds the per-date curves in long format
//! (`strategy,date,average_return,cumulative_return`) and
//! `<output stem>_metrics.csv` holds one metrics row per strategy.

use std::path::Path;

use crate::domain::backtest::BacktestReport;
use crate::domain::error::NewsalphaError;
use crate::ports::report_port::ReportPort;

const EXPECTED_RANDOM_LABEL: &str = "expected_random";

pub struct CsvReportAdapter;

fn csv_error(path: &Path, e: csv::Error) -> NewsalphaError {
    NewsalphaError::Io(std::io::Error::other(format!(
        "failed to write {}: {}",
        path.display(),
        e
    )))
}

fn metrics_path(output_path: &Path) -> std::path::PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!("{stem}_metrics.csv"))
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &BacktestReport, output_path: &Path) -> Result<(), NewsalphaError> {
        let mut curves =
            csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        curves
            .write_record(["strategy", "date", "average_return", "cumulative_return"])
            .map_err(|e| csv_error(output_path, e))?;

        for (label, series) in &report.strategies {
            for point in &series.points {
                curves
                    .write_record([
                        label.as_str(),
                        &point.date.to_string(),
                        &point.average_return.to_string(),
                        &point.cumulative_return.to_string(),
                    ])
                    .map_err(|e| csv_error(output_path, e))?;
            }
        }
        for (date, cumulative) in &report.random_benchmark.curve {
            curves
                .write_record([
                    EXPECTED_RANDOM_LABEL,
                    &date.to_string(),
                    "",
                    &cumulative.to_string(),
                ])
                .map_err(|e| csv_error(output_path, e))?;
        }
        curves.flush()?;

        let metrics_file = metrics_path(output_path);
        let mut metrics =
            csv::Writer::from_path(&metrics_file).map_err(|e| csv_error(&metrics_file, e))?;
        metrics
            .write_record([
                "strategy",
                "sharpe",
                "mean_daily_pct",
                "std_daily_pct",
                "max_drawdown_pct",
            ])
            .map_err(|e| csv_error(&metrics_file, e))?;

        let all_metrics = report
            .strategies
            .iter()
            .map(|(label, series)| (label.as_str(), series.metrics))
            .chain(std::iter::once((
                EXPECTED_RANDOM_LABEL,
                report.random_benchmark.metrics,
            )));
        for (label, m) in all_metrics {
            metrics
                .write_record([
                    label,
                    &m.sharpe.to_string(),
                    &m.mean_daily_pct.to_string(),
                    &m.std_daily_pct.to_string(),
                    &m.max_drawdown_pct.to_string(),
                ])
                .map_err(|e| csv_error(&metrics_file, e))?;
        }
        metrics.flush()?;

        Ok(())
    }
}
