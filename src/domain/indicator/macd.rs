//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) over the defined part of the MACD line,
//!               spread back over the full index space
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::indicator::{
    IndicatorSeries, align_to_sparse_indices, calculate_ema,
};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(prices, fast);
    let ema_slow = calculate_ema(prices, slow);

    let line = IndicatorSeries::from_values(
        (0..prices.len())
            .map(|i| match (ema_fast.get(i), ema_slow.get(i)) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect(),
    );

    let dense_signal = calculate_ema(&line.defined_values(), signal_period);
    let signal = align_to_sparse_indices(&dense_signal, &line.defined_mask());

    let histogram = IndicatorSeries::from_values(
        (0..prices.len())
            .map(|i| match (line.get(i), signal.get(i)) {
                (Some(l), Some(s)) => Some(l - s),
                _ => None,
            })
            .collect(),
    );

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(prices: &[f64]) -> MacdSeries {
    calculate_macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
