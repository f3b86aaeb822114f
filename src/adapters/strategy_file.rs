//! Loads JSON strategy definitions from disk.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::config_parser::parse_strategy;
use crate::domain::error::PapertraderError;
use crate::domain::strategy::StrategyConfig;

/// Read and normalize a strategy file. Only unreadable files and invalid
/// JSON are errors; rule-level problems fall back inside the parser.
pub fn load_strategy<P: AsRef<Path>>(path: P) -> Result<StrategyConfig, PapertraderError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| PapertraderError::StrategyParse {
            file: path.display().to_string(),
            source,
        })?;

    let config = parse_strategy(&value);
    info!(
        file = %path.display(),
        entry_rules = config.entry_rules.len(),
        exit_rules = config.exit_rules.len(),
        "loaded strategy"
    );
    Ok(config)
}
