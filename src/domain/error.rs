//! Error types for the file-driven surface around the engine.
//!
//! The simulator, indicators and rule evaluator never fail; everything here
//! comes from loading inputs or writing reports.

/// Top-level error type for papertrader.
#[derive(Debug, thiserror::Error)]
pub enum PapertraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy file {file}: {source}")]
    StrategyParse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("malformed data for {symbol} at row {row}: {reason}")]
    DataFormat {
        symbol: String,
        row: usize,
        reason: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PapertraderError {
    /// Process exit status: 1 for I/O, 2 for configuration, 5 for data.
    pub fn exit_status(&self) -> u8 {
        match self {
            PapertraderError::Io(_) | PapertraderError::Json(_) => 1,
            PapertraderError::ConfigParse { .. }
            | PapertraderError::ConfigMissing { .. }
            | PapertraderError::ConfigInvalid { .. }
            | PapertraderError::StrategyParse { .. } => 2,
            PapertraderError::NoData { .. } | PapertraderError::DataFormat { .. } => 5,
        }
    }
}

impl From<&PapertraderError> for std::process::ExitCode {
    fn from(err: &PapertraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
