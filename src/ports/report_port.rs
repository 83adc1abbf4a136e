//! Report output port.

use std::path::Path;

use crate::domain::backtest::BacktestReport;
use crate::domain::error::NewsalphaError;

/// Hands the finished comparison to the plotting/reporting collaborator.
/// The domain core never writes output itself.
pub trait ReportPort {
    fn write(&self, report: &BacktestReport, output_path: &Path) -> Result<(), NewsalphaError>;
}
