//! Technical indicator implementations.
//!
//! Every calculation returns an [`IndicatorSeries`] with exactly one cell per
//! input bar. Cells inside an indicator's lookback are `None`; nothing is ever
//! omitted, so index `i` of any series always lines up with bar `i`.
//!
//! - [`IndicatorSeries`]: length-aligned optional values
//! - [`IndicatorKind`]: which output series (MACD line, Bollinger upper, ...)
//! - [`IndicatorKey`]: kind + period, the cache key

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;

pub use atr::calculate_atr;
pub use bollinger::{BollingerBands, calculate_bollinger};
pub use ema::calculate_ema;
pub use macd::{MacdSeries, calculate_macd};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{StochasticSeries, calculate_stochastic};
pub use vwap::calculate_vwap;

use serde::Serialize;
use std::fmt;

/// True when a cell holds a usable number.
pub fn is_defined(value: Option<f64>) -> bool {
    value.is_some_and(f64::is_finite)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn defined_mask(&self) -> Vec<bool> {
        self.values.iter().map(|v| is_defined(*v)).collect()
    }

    /// The defined cells in order, with the gaps squeezed out.
    pub fn defined_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| v.filter(|x| x.is_finite()))
            .collect()
    }

    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| is_defined(*v))
    }
}

/// Spread a dense series back over the positions flagged in `mask`.
///
/// The i-th cell of `dense` lands on the i-th `true` of `mask`; every other
/// position is `None`. The result always has `mask.len()` cells. Surplus
/// dense cells are dropped, missing ones leave their slots undefined.
pub fn align_to_sparse_indices(dense: &IndicatorSeries, mask: &[bool]) -> IndicatorSeries {
    let mut dense_iter = dense.values().iter();
    let values = mask
        .iter()
        .map(|&defined| {
            if defined {
                dense_iter.next().copied().flatten()
            } else {
                None
            }
        })
        .collect();
    IndicatorSeries::from_values(values)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    Atr,
    StochasticK,
    StochasticD,
    Vwap,
    Obv,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 14] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
        IndicatorKind::MacdLine,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHistogram,
        IndicatorKind::BollingerUpper,
        IndicatorKind::BollingerMiddle,
        IndicatorKind::BollingerLower,
        IndicatorKind::Atr,
        IndicatorKind::StochasticK,
        IndicatorKind::StochasticD,
        IndicatorKind::Vwap,
        IndicatorKind::Obv,
    ];

    /// Period used when a rule names the indicator without one. `None` for
    /// indicators whose parameters are fixed.
    pub fn default_period(self) -> Option<usize> {
        match self {
            IndicatorKind::Sma | IndicatorKind::Ema => Some(20),
            IndicatorKind::Rsi => Some(rsi::DEFAULT_PERIOD),
            IndicatorKind::Atr => Some(atr::DEFAULT_PERIOD),
            IndicatorKind::BollingerUpper
            | IndicatorKind::BollingerMiddle
            | IndicatorKind::BollingerLower => Some(bollinger::DEFAULT_PERIOD),
            IndicatorKind::StochasticK | IndicatorKind::StochasticD => {
                Some(stochastic::DEFAULT_K_PERIOD)
            }
            IndicatorKind::MacdLine
            | IndicatorKind::MacdSignal
            | IndicatorKind::MacdHistogram
            | IndicatorKind::Vwap
            | IndicatorKind::Obv => None,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::MacdLine => "MACD",
            IndicatorKind::MacdSignal => "MACD_SIGNAL",
            IndicatorKind::MacdHistogram => "MACD_HISTOGRAM",
            IndicatorKind::BollingerUpper => "BOLLINGER_UPPER",
            IndicatorKind::BollingerMiddle => "BOLLINGER_MIDDLE",
            IndicatorKind::BollingerLower => "BOLLINGER_LOWER",
            IndicatorKind::Atr => "ATR",
            IndicatorKind::StochasticK => "STOCHASTIC_K",
            IndicatorKind::StochasticD => "STOCHASTIC_D",
            IndicatorKind::Vwap => "VWAP",
            IndicatorKind::Obv => "OBV",
        };
        f.write_str(name)
    }
}

/// Identity of one cached series. Fixed-parameter indicators carry period 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndicatorKey {
    pub kind: IndicatorKind,
    pub period: usize,
}

impl IndicatorKey {
    pub fn new(kind: IndicatorKind, period: Option<usize>) -> Self {
        let period = match kind.default_period() {
            Some(default) => period.unwrap_or(default),
            None => 0,
        };
        Self { kind, period }
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.default_period().is_some() {
            write!(f, "{}({})", self.kind, self.period)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}
