#![allow(dead_code)]

use chrono::NaiveDate;
use papertrader::domain::backtest::BacktestResult;
use papertrader::domain::error::PapertraderError;
pub use papertrader::domain::ohlcv::Bar;
use papertrader::domain::rule::{Condition, StrategyRule};
use papertrader::domain::strategy::StrategyConfig;
use papertrader::ports::data_port::DataPort;
use papertrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PapertraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PapertraderError::DataFormat {
                symbol: symbol.to_string(),
                row: 0,
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PapertraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub struct MockReportPort {
    pub calls: RefCell<Vec<(BacktestResult, String)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), PapertraderError> {
        self.calls
            .borrow_mut()
            .push((result.clone(), output_path.to_string()));
        Ok(())
    }
}

pub fn date_string(start: NaiveDate, offset: usize) -> String {
    (start + chrono::Duration::days(offset as i64))
        .format("%Y-%m-%d")
        .to_string()
}

/// Bar whose open/high/low sit one unit around `close`.
pub fn make_bar(date: &str, close: f64) -> Bar {
    Bar {
        date: date.to_string(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// Daily bars from `closes`, starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(&date_string(start, i), c))
        .collect()
}

/// `count` daily bars with close rising by one each day from `start_price`.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| make_bar(&date_string(start, i), start_price + i as f64))
        .collect()
}

/// Deterministic oscillating series with enough swings to trigger
/// mean-reversion rules.
pub fn sine_closes(count: usize, mid: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..count)
        .map(|i| mid + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect()
}

pub fn close_rule(condition: Condition, value: f64) -> StrategyRule {
    StrategyRule::literal("close", None, condition, value)
}

pub fn strategy(entry: Vec<StrategyRule>, exit: Vec<StrategyRule>) -> StrategyConfig {
    StrategyConfig {
        entry_rules: entry,
        exit_rules: exit,
        ..StrategyConfig::default()
    }
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[Bar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
