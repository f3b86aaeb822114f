//! Per-run indicator lookup table.
//!
//! Built in two phases: [`required_keys`] collects every `(kind, period)` a
//! strategy reads, then [`IndicatorCache::build`] computes each one once.
//! Multi-output indicators (MACD, Bollinger, Stochastic) are computed once per
//! period and every output is stored under its own key. Nothing is added after
//! `build` returns.

use std::collections::{BTreeSet, HashMap};

use crate::domain::indicator::macd::calculate_macd_default;
use crate::domain::indicator::{
    IndicatorKey, IndicatorKind, IndicatorSeries, bollinger, calculate_atr, calculate_bollinger,
    calculate_ema, calculate_obv, calculate_rsi, calculate_sma, calculate_stochastic,
    calculate_vwap, stochastic,
};
use crate::domain::ohlcv::{Bar, closes};
use crate::domain::strategy::StrategyConfig;

/// Series materialized for every run whether or not a rule reads them.
pub const ALWAYS_COMPUTED: [IndicatorKey; 2] = [
    IndicatorKey {
        kind: IndicatorKind::Sma,
        period: 20,
    },
    IndicatorKey {
        kind: IndicatorKind::Rsi,
        period: 14,
    },
];

/// Every key referenced by the entry and exit rules, plus [`ALWAYS_COMPUTED`].
pub fn required_keys(config: &StrategyConfig) -> BTreeSet<IndicatorKey> {
    let mut keys: BTreeSet<IndicatorKey> = ALWAYS_COMPUTED.into_iter().collect();
    for rule in config.entry_rules.iter().chain(config.exit_rules.iter()) {
        keys.extend(rule.indicator_keys());
    }
    keys
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorCache {
    series: HashMap<IndicatorKey, IndicatorSeries>,
}

impl IndicatorCache {
    pub fn build(bars: &[Bar], config: &StrategyConfig) -> Self {
        Self::from_keys(bars, &required_keys(config))
    }

    pub fn from_keys(bars: &[Bar], keys: &BTreeSet<IndicatorKey>) -> Self {
        let prices = closes(bars);
        let mut series = HashMap::with_capacity(keys.len());

        for key in keys {
            if series.contains_key(key) {
                continue;
            }
            match key.kind {
                IndicatorKind::Sma => {
                    series.insert(*key, calculate_sma(&prices, key.period));
                }
                IndicatorKind::Ema => {
                    series.insert(*key, calculate_ema(&prices, key.period));
                }
                IndicatorKind::Rsi => {
                    series.insert(*key, calculate_rsi(&prices, key.period));
                }
                IndicatorKind::Atr => {
                    series.insert(*key, calculate_atr(bars, key.period));
                }
                IndicatorKind::Vwap => {
                    series.insert(*key, calculate_vwap(bars));
                }
                IndicatorKind::Obv => {
                    series.insert(*key, calculate_obv(bars));
                }
                IndicatorKind::MacdLine | IndicatorKind::MacdSignal | IndicatorKind::MacdHistogram => {
                    let macd = calculate_macd_default(&prices);
                    series.insert(key_of(IndicatorKind::MacdLine, 0), macd.line);
                    series.insert(key_of(IndicatorKind::MacdSignal, 0), macd.signal);
                    series.insert(key_of(IndicatorKind::MacdHistogram, 0), macd.histogram);
                }
                IndicatorKind::BollingerUpper
                | IndicatorKind::BollingerMiddle
                | IndicatorKind::BollingerLower => {
                    let bands =
                        calculate_bollinger(&prices, key.period, bollinger::DEFAULT_STDDEV_MULT);
                    series.insert(key_of(IndicatorKind::BollingerUpper, key.period), bands.upper);
                    series.insert(key_of(IndicatorKind::BollingerMiddle, key.period), bands.middle);
                    series.insert(key_of(IndicatorKind::BollingerLower, key.period), bands.lower);
                }
                IndicatorKind::StochasticK | IndicatorKind::StochasticD => {
                    let stoch =
                        calculate_stochastic(bars, key.period, stochastic::DEFAULT_D_PERIOD);
                    series.insert(key_of(IndicatorKind::StochasticK, key.period), stoch.k);
                    series.insert(key_of(IndicatorKind::StochasticD, key.period), stoch.d);
                }
            }
        }

        tracing::debug!(series = series.len(), bars = bars.len(), "indicator cache built");
        Self { series }
    }

    pub fn get(&self, key: &IndicatorKey) -> Option<&IndicatorSeries> {
        self.series.get(key)
    }

    /// Value of `key` at `index`; `None` when the series is missing or the
    /// cell is undefined.
    pub fn value(&self, key: &IndicatorKey, index: usize) -> Option<f64> {
        self.series.get(key).and_then(|s| s.get(index))
    }

    pub fn contains(&self, key: &IndicatorKey) -> bool {
        self.series.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Keys in a stable order.
    pub fn keys(&self) -> Vec<IndicatorKey> {
        let mut keys: Vec<IndicatorKey> = self.series.keys().copied().collect();
        keys.sort();
        keys
    }
}

fn key_of(kind: IndicatorKind, period: usize) -> IndicatorKey {
    IndicatorKey { kind, period }
}
