//! Exponential Moving Average.
//!
//! k = 2/(n+1). Cells before n-1 hold the running mean of the prices seen so
//! far, cell n-1 is the SMA of the first window, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//!
//! The progressive seed would define every cell as soon as one window fits,
//! so the series stays undefined unless the data is longer than the period.

use crate::domain::indicator::IndicatorSeries;

pub fn calculate_ema(prices: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || period >= prices.len() {
        return IndicatorSeries::undefined(prices.len());
    }

    let mut values = Vec::with_capacity(prices.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        if i < period {
            sum += price;
            ema = sum / (i + 1) as f64;
        } else {
            ema = price * k + ema * (1.0 - k);
        }
        values.push(Some(ema));
    }

    IndicatorSeries::from_values(values)
}
