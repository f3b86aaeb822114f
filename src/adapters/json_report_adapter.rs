//! JSON report writer.

use std::fs;
use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PapertraderError;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, result: &BacktestResult) -> Result<String, PapertraderError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(json)
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), PapertraderError> {
        let mut json = self.render(result)?;
        json.push('\n');

        if output_path == "-" {
            std::io::stdout().lock().write_all(json.as_bytes())?;
        } else {
            fs::write(output_path, json)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::run_backtest;
    use crate::domain::ohlcv::Bar;
    use crate::domain::strategy::StrategyConfig;
    use tempfile::TempDir;

    fn flat_result() -> BacktestResult {
        let bars: Vec<Bar> = (0..55)
            .map(|i| Bar {
                date: format!("2024-03-{:02}", i % 28 + 1),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.0,
                volume: 500.0,
            })
            .collect();
        run_backtest(&bars, &StrategyConfig::default_rules(), 1_000.0)
    }

    #[test]
    fn writes_camel_case_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let path_str = path.to_str().unwrap();

        JsonReportAdapter::default()
            .write(&flat_result(), path_str)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(json["trades"].as_array().unwrap().is_empty());
        assert_eq!(json["equityCurve"].as_array().unwrap().len(), 5);
        assert_eq!(json["metrics"]["finalCapital"], 1000.0);
    }

    #[test]
    fn compact_is_single_line() {
        let rendered = JsonReportAdapter::new(false).render(&flat_result()).unwrap();
        assert!(!rendered.contains('\n'));
        let pretty = JsonReportAdapter::new(true).render(&flat_result()).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let err = JsonReportAdapter::default()
            .write(&flat_result(), "/nonexistent/dir/out.json")
            .unwrap_err();
        assert!(matches!(err, PapertraderError::Io(_)));
    }
}
