//! On-Balance Volume.
//!
//! OBV[0] = 0. On each later bar: +volume when the close rises, -volume when
//! it falls, unchanged when it is equal.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;

pub fn calculate_obv(bars: &[Bar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev_close = bars[i - 1].close;
            if bar.close > prev_close {
                obv += bar.volume;
            } else if bar.close < prev_close {
                obv -= bar.volume;
            }
        }
        values.push(Some(obv));
    }

    IndicatorSeries::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(close: f64, volume: f64) -> Bar {
        Bar {
            date: "2024-01-01".into(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn obv_running_sum() {
        let bars = vec![
            make_bar(10.0, 100.0),
            make_bar(11.0, 200.0),
            make_bar(11.0, 300.0),
            make_bar(9.0, 50.0),
        ];
        let series = calculate_obv(&bars);
        assert_eq!(
            series.values(),
            &[Some(0.0), Some(200.0), Some(200.0), Some(150.0)]
        );
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[]).is_empty());
    }
}
