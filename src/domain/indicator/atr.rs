//! Average True Range.
//!
//! TR[0] = high - low (no previous close), TR[i] = max(high-low,
//! |high-prev_close|, |low-prev_close|). ATR is the simple moving average of
//! TR, so the first (n-1) cells are undefined.

use crate::domain::indicator::{IndicatorSeries, calculate_sma};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    calculate_sma(&true_range(bars), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: format!("2024-01-{:02}", day),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn atr_warmup() {
        let bars: Vec<Bar> = (1..=5).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 3);

        assert_eq!(series.len(), 5);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert_abs_diff_eq!(series.get(2).unwrap(), 20.0);
        assert_abs_diff_eq!(series.get(4).unwrap(), 20.0);
    }

    #[test]
    fn atr_first_true_range_ignores_missing_close() {
        let bars = vec![make_bar(1, 110.0, 100.0, 105.0)];
        assert_eq!(true_range(&bars), vec![10.0]);
    }

    #[test]
    fn atr_is_simple_average_of_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 130.0, 120.0, 125.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        // TR: 10, max(10, 25, 15)=25, max(10, 5, 15)=15
        let series = calculate_atr(&bars, 2);
        assert_abs_diff_eq!(series.get(1).unwrap(), 17.5);
        assert_abs_diff_eq!(series.get(2).unwrap(), 20.0);
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars: Vec<Bar> = (1..=2).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 5);
        assert_eq!(series.len(), 2);
        assert!(series.first_defined().is_none());
    }
}
