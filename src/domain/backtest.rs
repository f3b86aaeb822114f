//! Bar-by-bar backtest simulator.
//!
//! The loop is a two-state machine (flat / in position) over the bars past
//! the warm-up offset. Exits are checked in a fixed order: stop loss, take
//! profit, exit rules, then forced closure on the final bar. Every fill
//! happens at the bar's close.

use serde::Serialize;
use tracing::debug;

use super::indicator_cache::IndicatorCache;
use super::metrics::Metrics;
use super::ohlcv::Bar;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{ExitReason, Position, Trade};
use super::rule_eval::{entry_signal, exit_signal};
use super::strategy::StrategyConfig;

/// Bars skipped before the first simulated bar.
pub const WARMUP_BARS: usize = 50;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    fn empty(initial_capital: f64) -> Self {
        BacktestResult {
            trades: Vec::new(),
            metrics: Metrics::empty(initial_capital),
            equity_curve: Vec::new(),
        }
    }
}

/// Replay `config` over `bars`. Returns an empty result when there are no
/// more bars than the warm-up offset.
pub fn run_backtest(bars: &[Bar], config: &StrategyConfig, initial_capital: f64) -> BacktestResult {
    if bars.len() <= WARMUP_BARS {
        debug!(
            bars = bars.len(),
            warmup = WARMUP_BARS,
            "not enough bars to simulate"
        );
        return BacktestResult::empty(initial_capital);
    }

    let cache = IndicatorCache::build(bars, config);
    let mut portfolio = Portfolio::new(initial_capital);
    let last = bars.len() - 1;

    for (index, bar) in bars.iter().enumerate().skip(WARMUP_BARS) {
        if let Some(position) = &portfolio.position {
            if let Some(reason) = exit_reason(position, config, index, last, bars, &cache) {
                if let Some(trade) = portfolio.close(&bar.date, bar.close, reason) {
                    debug!(
                        date = %trade.exit_date,
                        price = trade.exit_price,
                        pnl = trade.pnl,
                        reason = %trade.exit_reason,
                        "exit"
                    );
                }
            }
        } else if index < last && entry_signal(&config.entry_rules, index, bars, &cache) {
            let quantity = config.quantity_for(portfolio.capital, bar.close);
            if quantity > 0.0 {
                debug!(date = %bar.date, price = bar.close, quantity, "entry");
                portfolio.open(Position {
                    entry_date: bar.date.clone(),
                    entry_price: bar.close,
                    quantity,
                });
            }
        }

        let equity = portfolio.equity(bar.close);
        portfolio.record_equity(&bar.date, equity);
    }

    let metrics = Metrics::compute(&portfolio);
    BacktestResult {
        trades: portfolio.closed_trades,
        metrics,
        equity_curve: portfolio.equity_curve,
    }
}

fn exit_reason(
    position: &Position,
    config: &StrategyConfig,
    index: usize,
    last: usize,
    bars: &[Bar],
    cache: &IndicatorCache,
) -> Option<ExitReason> {
    let bar = &bars[index];

    if config
        .stop_loss()
        .is_some_and(|sl| position.should_stop_loss(bar.low, sl))
    {
        return Some(ExitReason::StopLoss);
    }
    if config
        .take_profit()
        .is_some_and(|tp| position.should_take_profit(bar.high, tp))
    {
        return Some(ExitReason::TakeProfit);
    }
    if exit_signal(&config.exit_rules, index, bars, cache).is_some() {
        return Some(ExitReason::ExitSignal);
    }
    if index == last {
        return Some(ExitReason::EndOfData);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{Condition, StrategyRule};
    use crate::domain::strategy::{PositionSizing, RiskLimits, SizingType};
    use approx::assert_abs_diff_eq;

    fn bar(day: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: format!("2024-{:02}-{:02}", day / 28 + 1, day % 28 + 1),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| bar(i, price, price + 1.0, price - 1.0, price))
            .collect()
    }

    fn enter_above(threshold: f64) -> Vec<StrategyRule> {
        vec![StrategyRule::literal(
            "close",
            None,
            Condition::GreaterThan,
            threshold,
        )]
    }

    #[test]
    fn insufficient_data_is_empty() {
        let bars = flat_bars(WARMUP_BARS, 100.0);
        let result = run_backtest(&bars, &StrategyConfig::default_rules(), 50_000.0);
        assert!(result.trades.is_empty());
        assert!(result.equity_curve.is_empty());
        assert_eq!(result.metrics, Metrics::empty(50_000.0));
    }

    #[test]
    fn equity_recorded_from_offset() {
        let bars = flat_bars(60, 100.0);
        let result = run_backtest(&bars, &StrategyConfig::default_rules(), 10_000.0);
        assert_eq!(result.equity_curve.len(), 60 - WARMUP_BARS);
        assert_eq!(result.equity_curve[0].date, bars[WARMUP_BARS].date);
    }

    #[test]
    fn end_of_data_closes_open_position() {
        let mut bars = flat_bars(60, 100.0);
        bars[58] = bar(58, 105.0, 106.0, 104.0, 105.0);
        bars[59] = bar(59, 107.0, 108.0, 106.0, 107.0);
        let config = StrategyConfig {
            entry_rules: enter_above(104.0),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_date, bars[58].date);
        assert_eq!(trade.exit_date, bars[59].date);
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
        // 10% of 100k at 105 -> 95 units
        assert_abs_diff_eq!(trade.quantity, 95.0);
        assert_abs_diff_eq!(trade.pnl, 190.0);
    }

    #[test]
    fn no_entry_on_final_bar() {
        let mut bars = flat_bars(60, 100.0);
        bars[59] = bar(59, 105.0, 106.0, 104.0, 105.0);
        let config = StrategyConfig {
            entry_rules: enter_above(104.0),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn stop_loss_beats_exit_rule() {
        let mut bars = flat_bars(60, 100.0);
        bars[52] = bar(52, 100.0, 100.0, 80.0, 90.0);
        let config = StrategyConfig {
            entry_rules: enter_above(0.0),
            exit_rules: vec![StrategyRule::literal(
                "close",
                None,
                Condition::LessThan,
                95.0,
            )],
            risk_limits: Some(RiskLimits {
                stop_loss: Some(5.0),
                ..RiskLimits::default()
            }),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);

        let first = &result.trades[0];
        assert_eq!(first.exit_date, bars[52].date);
        assert_eq!(first.exit_reason, ExitReason::StopLoss);
        assert_abs_diff_eq!(first.exit_price, 90.0);
    }

    #[test]
    fn take_profit_before_exit_rule() {
        let mut bars = flat_bars(60, 100.0);
        bars[51] = bar(51, 100.0, 125.0, 99.0, 120.0);
        let config = StrategyConfig {
            entry_rules: enter_above(0.0),
            exit_rules: vec![StrategyRule::literal(
                "close",
                None,
                Condition::GreaterThan,
                110.0,
            )],
            risk_limits: Some(RiskLimits {
                stop_loss: Some(50.0),
                take_profit: Some(10.0),
                max_position_size: None,
            }),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);
        assert_eq!(result.trades[0].exit_reason, ExitReason::TakeProfit);
        assert_abs_diff_eq!(result.trades[0].exit_price, 120.0);
    }

    #[test]
    fn stop_loss_before_take_profit_on_same_bar() {
        let mut bars = flat_bars(60, 100.0);
        // low breaches a 5% stop, high breaches a 10% target
        bars[51] = bar(51, 100.0, 130.0, 80.0, 110.0);
        let config = StrategyConfig {
            entry_rules: enter_above(0.0),
            risk_limits: Some(RiskLimits {
                stop_loss: Some(5.0),
                take_profit: Some(10.0),
                max_position_size: None,
            }),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);
        assert_eq!(result.trades[0].exit_date, bars[51].date);
        assert_eq!(result.trades[0].exit_reason, ExitReason::StopLoss);
        assert_abs_diff_eq!(result.trades[0].exit_price, 110.0);
    }

    #[test]
    fn zero_quantity_suppresses_entry() {
        let bars = flat_bars(60, 100.0);
        let config = StrategyConfig {
            entry_rules: enter_above(0.0),
            position_sizing: Some(PositionSizing {
                sizing_type: SizingType::Fixed,
                value: 1.0,
            }),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);
        assert!(result.trades.is_empty());
        assert!(result.equity_curve.iter().all(|p| p.value == 100_000.0));
    }

    #[test]
    fn capital_carries_between_trades() {
        let mut bars = flat_bars(60, 100.0);
        // exit on the close dropping to 90, then re-enter
        bars[53] = bar(53, 90.0, 91.0, 89.0, 90.0);
        let config = StrategyConfig {
            entry_rules: enter_above(95.0),
            exit_rules: vec![StrategyRule::literal(
                "close",
                None,
                Condition::LessThan,
                95.0,
            )],
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].exit_reason, ExitReason::ExitSignal);
        assert_abs_diff_eq!(result.trades[0].pnl, -1000.0);
        assert_eq!(result.trades[1].exit_reason, ExitReason::EndOfData);
        // 10% of 99k at 100
        assert_abs_diff_eq!(result.trades[1].quantity, 99.0);
        assert_abs_diff_eq!(result.metrics.final_capital, 99_000.0);
    }

    #[test]
    fn equity_tracks_unrealized_pnl() {
        let mut bars = flat_bars(60, 100.0);
        bars[51] = bar(51, 110.0, 111.0, 109.0, 110.0);
        let config = StrategyConfig {
            entry_rules: enter_above(0.0),
            ..StrategyConfig::default()
        };
        let result = run_backtest(&bars, &config, 100_000.0);
        // 100 units bought at 100 on bar 50
        assert_abs_diff_eq!(result.equity_curve[0].value, 100_000.0);
        assert_abs_diff_eq!(result.equity_curve[1].value, 101_000.0);
        assert_abs_diff_eq!(result.equity_curve[2].value, 100_000.0);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let bars = flat_bars(70, 100.0);
        let snapshot = bars.clone();
        let config = StrategyConfig::default_rules();
        let config_snapshot = config.clone();
        let _ = run_backtest(&bars, &config, DEFAULT_INITIAL_CAPITAL);
        assert_eq!(bars, snapshot);
        assert_eq!(config, config_snapshot);
    }
}
