//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) cells are undefined.

use crate::domain::indicator::IndicatorSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

pub fn calculate_bollinger(prices: &[f64], period: usize, mult: f64) -> BollingerBands {
    let len = prices.len();
    if period == 0 || period > len {
        return BollingerBands {
            upper: IndicatorSeries::undefined(len),
            middle: IndicatorSeries::undefined(len),
            lower: IndicatorSeries::undefined(len),
        };
    }

    let mut upper = Vec::with_capacity(len);
    let mut middle = Vec::with_capacity(len);
    let mut lower = Vec::with_capacity(len);

    for i in 0..len {
        if i + 1 < period {
            upper.push(None);
            middle.push(None);
            lower.push(None);
            continue;
        }

        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|p| {
                let diff = p - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        upper.push(Some(mean + mult * stddev));
        middle.push(Some(mean));
        lower.push(Some(mean - mult * stddev));
    }

    BollingerBands {
        upper: IndicatorSeries::from_values(upper),
        middle: IndicatorSeries::from_values(middle),
        lower: IndicatorSeries::from_values(lower),
    }
}
