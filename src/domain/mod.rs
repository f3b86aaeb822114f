//! Core domain types and logic: indicators, rules, the simulator and metrics.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_cache;
pub mod rule;
pub mod rule_eval;
pub mod strategy;
pub mod config_parser;
pub mod position;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod error;
