//! Backtest result sink port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PapertraderError;

/// Port for writing backtest reports.
pub trait ReportPort {
    /// Write `result` to `output_path`; `-` means standard output.
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), PapertraderError>;
}
