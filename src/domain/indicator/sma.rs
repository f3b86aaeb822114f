//! Simple Moving Average.
//!
//! SMA[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) cells are undefined.

use crate::domain::indicator::IndicatorSeries;

pub fn calculate_sma(prices: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || period > prices.len() {
        return IndicatorSeries::undefined(prices.len());
    }

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &prices[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect();

    IndicatorSeries::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sma_warmup() {
        let series = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(series.len(), 5);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert!(series.get(2).is_some());
    }

    #[test]
    fn sma_values() {
        let series = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_abs_diff_eq!(series.get(2).unwrap(), 2.0);
        assert_abs_diff_eq!(series.get(3).unwrap(), 3.0);
        assert_abs_diff_eq!(series.get(4).unwrap(), 4.0);
    }

    #[test]
    fn sma_period_1_is_identity() {
        let prices = [10.0, 11.5, 9.25];
        let series = calculate_sma(&prices, 1);
        for (i, p) in prices.iter().enumerate() {
            assert_abs_diff_eq!(series.get(i).unwrap(), *p);
        }
    }

    #[test]
    fn sma_period_longer_than_data() {
        let series = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(series.len(), 2);
        assert!(series.first_defined().is_none());
    }

    #[test]
    fn sma_period_0() {
        let series = calculate_sma(&[1.0, 2.0], 0);
        assert_eq!(series.len(), 2);
        assert!(series.first_defined().is_none());
    }

    #[test]
    fn sma_empty() {
        assert!(calculate_sma(&[], 3).is_empty());
    }
}
