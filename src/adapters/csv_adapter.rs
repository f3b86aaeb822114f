//! CSV file data adapter.
//!
//! One file per symbol, `<base_path>/<symbol>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO `YYYY-MM-DD` dates.

use crate::domain::error::PapertraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
    row: usize,
) -> Result<f64, PapertraderError> {
    let raw = record.get(index).ok_or_else(|| PapertraderError::DataFormat {
        symbol: symbol.to_string(),
        row,
        reason: format!("missing {} column", name),
    })?;
    let value: f64 = raw.trim().parse().map_err(|e| PapertraderError::DataFormat {
        symbol: symbol.to_string(),
        row,
        reason: format!("invalid {} value {:?}: {}", name, raw, e),
    })?;
    if !value.is_finite() {
        return Err(PapertraderError::DataFormat {
            symbol: symbol.to_string(),
            row,
            reason: format!("non-finite {} value", name),
        });
    }
    Ok(value)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PapertraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PapertraderError::NoData {
                symbol: symbol.to_string(),
            },
            _ => PapertraderError::Io(e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut dated = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            // header is row 1
            let row = i + 2;
            let record = result.map_err(|e| PapertraderError::DataFormat {
                symbol: symbol.to_string(),
                row,
                reason: e.to_string(),
            })?;

            let date_str = record.get(0).ok_or_else(|| PapertraderError::DataFormat {
                symbol: symbol.to_string(),
                row,
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).map_err(|e| {
                PapertraderError::DataFormat {
                    symbol: symbol.to_string(),
                    row,
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            let bar = Bar {
                date: date.format(DATE_FORMAT).to_string(),
                open: column(&record, 1, "open", symbol, row)?,
                high: column(&record, 2, "high", symbol, row)?,
                low: column(&record, 3, "low", symbol, row)?,
                close: column(&record, 4, "close", symbol, row)?,
                volume: column(&record, 5, "volume", symbol, row)?,
            };
            dated.push((date, bar));
        }

        dated.sort_by_key(|(date, _)| *date);
        Ok(dated.into_iter().map(|(_, bar)| bar).collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, PapertraderError> {
        let mut symbols = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
