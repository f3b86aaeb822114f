//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::strategy_file::load_strategy;
use crate::domain::backtest::{
    self as backtest_engine, BacktestResult, DEFAULT_INITIAL_CAPITAL, WARMUP_BARS,
};
use crate::domain::error::PapertraderError;
use crate::domain::indicator::{IndicatorKey, IndicatorKind};
use crate::domain::indicator_cache::IndicatorCache;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::Bar;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Deterministic strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over one symbol's CSV bars
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// CSV file stem, as printed by `list-symbols`
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        #[arg(long)]
        capital: Option<f64>,
        /// Result file; `-` writes JSON to stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the normalized rules of a strategy file
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Print every indicator at its default period as CSV
    Indicators {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// List the symbols in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data_dir,
            symbol,
            strategy,
            capital,
            output,
        } => {
            let overrides = BacktestOverrides {
                data_dir,
                symbol,
                strategy,
                capital,
                output,
            };
            run_backtest(config.as_deref(), overrides)
        }
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Indicators { data_dir, symbol } => run_indicators(&data_dir, &symbol),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Command-line values that take precedence over the `[backtest]` section.
#[derive(Debug, Clone, Default)]
pub struct BacktestOverrides {
    pub data_dir: Option<PathBuf>,
    pub symbol: Option<String>,
    pub strategy: Option<PathBuf>,
    pub capital: Option<f64>,
    pub output: Option<String>,
}

/// Fully resolved settings for one backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub data_dir: PathBuf,
    pub symbol: String,
    pub strategy: Option<PathBuf>,
    pub initial_capital: f64,
    pub output: String,
    pub pretty: bool,
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PapertraderError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Merge CLI overrides over the INI `[backtest]` and `[report]` sections.
pub fn resolve_settings(
    config: Option<&dyn ConfigPort>,
    overrides: BacktestOverrides,
) -> Result<BacktestSettings, PapertraderError> {
    let from_config = |key: &str| config.and_then(|c| c.get_string("backtest", key));

    let data_dir = match overrides.data_dir {
        Some(dir) => dir,
        None => PathBuf::from(require(config, "data_dir")?),
    };
    let symbol = match overrides.symbol {
        Some(symbol) => symbol,
        None => require(config, "symbol")?,
    };
    let symbol = symbol.trim().to_string();

    let strategy = overrides
        .strategy
        .or_else(|| from_config("strategy").filter(|s| !s.trim().is_empty()).map(PathBuf::from));

    let initial_capital = match overrides.capital {
        Some(capital) => capital,
        None => match config {
            Some(c) => c
                .get_double("backtest", "initial_capital")?
                .unwrap_or(DEFAULT_INITIAL_CAPITAL),
            None => DEFAULT_INITIAL_CAPITAL,
        },
    };
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        return Err(PapertraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_capital".into(),
            reason: format!("must be a positive number, got {}", initial_capital),
        });
    }

    let output = overrides
        .output
        .or_else(|| from_config("output"))
        .unwrap_or_else(|| "-".to_string());
    let pretty = config.is_none_or(|c| c.get_bool("report", "pretty", true));

    Ok(BacktestSettings {
        data_dir,
        symbol,
        strategy,
        initial_capital,
        output,
        pretty,
    })
}

fn require(config: Option<&dyn ConfigPort>, key: &str) -> Result<String, PapertraderError> {
    match config {
        Some(c) => c.require_string("backtest", key),
        None => Err(PapertraderError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        }),
    }
}

fn run_backtest(
    config_path: Option<&Path>,
    overrides: BacktestOverrides,
) -> Result<(), PapertraderError> {
    // Stage 1: settings
    let adapter = config_path.map(load_config).transpose()?;
    let settings = resolve_settings(adapter.as_ref().map(|a| a as &dyn ConfigPort), overrides)?;

    // Stage 2: strategy
    let strategy = match &settings.strategy {
        Some(path) => {
            eprintln!("Loading strategy from {}", path.display());
            load_strategy(path)?
        }
        None => {
            eprintln!("No strategy given, using default rules");
            StrategyConfig::default_rules()
        }
    };

    // Stage 3: data, simulation and report
    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let report_port = JsonReportAdapter::new(settings.pretty);
    let result = execute_backtest(&settings, &strategy, &data_port, &report_port)?;

    print_summary(&settings, &result.metrics);
    if settings.output != "-" {
        eprintln!("\nReport written to: {}", settings.output);
    }
    Ok(())
}

/// Fetch bars, simulate and hand the result to `report_port`.
pub fn execute_backtest(
    settings: &BacktestSettings,
    strategy: &StrategyConfig,
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
) -> Result<BacktestResult, PapertraderError> {
    let bars = fetch_non_empty(data_port, &settings.symbol)?;
    if bars.len() <= WARMUP_BARS {
        warn!(
            symbol = %settings.symbol,
            bars = bars.len(),
            warmup = WARMUP_BARS,
            "not enough bars past the warm-up window, no trades will be simulated"
        );
    }

    info!(
        symbol = %settings.symbol,
        bars = bars.len(),
        first = %bars[0].date,
        last = %bars[bars.len() - 1].date,
        capital = settings.initial_capital,
        "running backtest"
    );
    let result = backtest_engine::run_backtest(&bars, strategy, settings.initial_capital);
    info!(trades = result.trades.len(), "backtest complete");

    report_port.write(&result, &settings.output)?;
    Ok(result)
}

fn fetch_non_empty(data_port: &dyn DataPort, symbol: &str) -> Result<Vec<Bar>, PapertraderError> {
    let bars = data_port.fetch_bars(symbol)?;
    if bars.is_empty() {
        return Err(PapertraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

fn print_summary(settings: &BacktestSettings, metrics: &Metrics) {
    eprintln!("\n=== Results: {} ===", settings.symbol);
    eprintln!("Initial Capital:  {:.0}", settings.initial_capital);
    eprintln!("Final Capital:    {:.0}", metrics.final_capital);
    eprintln!("Total Return:     {:.2}%", metrics.total_return);
    eprintln!("Max Drawdown:     -{:.2}%", metrics.max_drawdown);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.2}%", metrics.win_rate);
    if metrics.profit_factor.is_infinite() {
        eprintln!("Profit Factor:    Infinity");
    } else {
        eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    }
    eprintln!("Expectancy:       {:.0}", metrics.expectancy);
    eprintln!(
        "Streaks:          {} wins / {} losses",
        metrics.max_consecutive_wins, metrics.max_consecutive_losses
    );
}

fn run_validate(strategy_path: &Path) -> Result<(), PapertraderError> {
    eprintln!("Validating strategy: {}", strategy_path.display());
    let strategy = load_strategy(strategy_path)?;
    eprint!("{}", describe_strategy(&strategy));
    eprintln!("\nStrategy configuration is valid.");
    Ok(())
}

/// Human-readable listing of normalized rules, sizing, risk limits and the
/// indicators a run will compute.
pub fn describe_strategy(strategy: &StrategyConfig) -> String {
    let mut out = String::new();

    out.push_str("\nEntry rules (all must hold):\n");
    if strategy.entry_rules.is_empty() {
        out.push_str("  (none, never enters)\n");
    }
    for rule in &strategy.entry_rules {
        out.push_str(&format!("  {}\n", rule));
    }

    out.push_str("\nExit rules (any may fire):\n");
    if strategy.exit_rules.is_empty() {
        out.push_str("  (none)\n");
    }
    for rule in &strategy.exit_rules {
        out.push_str(&format!("  {}\n", rule));
    }

    out.push_str("\nPosition sizing:\n");
    match &strategy.position_sizing {
        Some(sizing) => out.push_str(&format!(
            "  {:?} {}\n",
            sizing.sizing_type, sizing.value
        )),
        None => out.push_str("  default (10% of capital)\n"),
    }

    let limits = [
        ("stop loss", strategy.stop_loss()),
        ("take profit", strategy.take_profit()),
        ("max position size", strategy.max_position_size()),
    ];
    if limits.iter().any(|(_, v)| v.is_some()) {
        out.push_str("\nRisk limits:\n");
        for (name, value) in limits {
            if let Some(pct) = value {
                out.push_str(&format!("  {}: {}%\n", name, pct));
            }
        }
    }

    out.push_str("\nIndicators to compute:\n");
    for key in strategy.required_indicators() {
        out.push_str(&format!("  {}\n", key));
    }
    out
}

fn run_indicators(data_dir: &Path, symbol: &str) -> Result<(), PapertraderError> {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let bars = fetch_non_empty(&adapter, symbol)?;
    print!("{}", indicators_csv(&bars));
    Ok(())
}

/// Every indicator at its default parameters, one column each, undefined
/// cells left empty.
pub fn indicators_csv(bars: &[Bar]) -> String {
    let keys: BTreeSet<IndicatorKey> = IndicatorKind::ALL
        .into_iter()
        .map(|kind| IndicatorKey::new(kind, None))
        .collect();
    let cache = IndicatorCache::from_keys(bars, &keys);
    let columns = cache.keys();

    let mut out = String::from("date,close");
    for key in &columns {
        out.push(',');
        out.push_str(&key.to_string());
    }
    out.push('\n');

    for (i, bar) in bars.iter().enumerate() {
        out.push_str(&format!("{},{}", bar.date, bar.close));
        for key in &columns {
            out.push(',');
            if let Some(v) = cache.value(key, i) {
                out.push_str(&format!("{:.4}", v));
            }
        }
        out.push('\n');
    }
    out
}

fn run_list_symbols(data_dir: &Path) -> Result<(), PapertraderError> {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let symbols = adapter.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
