//! Volume Weighted Average Price.
//!
//! Cumulative from the first bar, not a rolling window:
//! VWAP[i] = Σ(typical_price × volume) / Σ volume over bars 0..=i.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;

pub fn calculate_vwap(bars: &[Bar]) -> IndicatorSeries {
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    let values = bars
        .iter()
        .map(|bar| {
            cum_pv += bar.typical_price() * bar.volume;
            cum_volume += bar.volume;
            if cum_volume == 0.0 {
                None
            } else {
                Some(cum_pv / cum_volume)
            }
        })
        .collect();

    IndicatorSeries::from_values(values)
}
