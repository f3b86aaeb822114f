//! Stochastic oscillator.
//!
//! %K = (close - lowest_low) / (highest_high - lowest_low) * 100 over the
//! trailing k window, 50 when the window has no range.
//! %D = SMA(d) of the defined %K cells, spread back over the full index space.

use crate::domain::indicator::{IndicatorSeries, align_to_sparse_indices, calculate_sma};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

/// %K reported when the window's high equals its low.
const FLAT_RANGE_K: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn calculate_stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> StochasticSeries {
    let len = bars.len();
    if k_period == 0 || k_period > len {
        return StochasticSeries {
            k: IndicatorSeries::undefined(len),
            d: IndicatorSeries::undefined(len),
        };
    }

    let k = IndicatorSeries::from_values(
        (0..len)
            .map(|i| {
                if i + 1 < k_period {
                    return None;
                }
                let window = &bars[i + 1 - k_period..=i];
                let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
                let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
                if highest == lowest {
                    Some(FLAT_RANGE_K)
                } else {
                    Some((bars[i].close - lowest) / (highest - lowest) * 100.0)
                }
            })
            .collect(),
    );

    let dense_d = calculate_sma(&k.defined_values(), d_period);
    let d = align_to_sparse_indices(&dense_d, &k.defined_mask());

    StochasticSeries { k, d }
}
