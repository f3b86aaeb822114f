//! Performance metrics derived from the closed trades and the portfolio
//! ledger.
//!
//! Percentages and ratios are rounded to 2 decimal places, currency figures
//! to whole units. No field is ever NaN; only `profit_factor` may be
//! infinite, and it serializes as the string `"Infinity"` in that case.

use serde::{Serialize, Serializer};

use super::portfolio::Portfolio;
use super::position::Trade;

/// Per-trade percent returns are treated as monthly returns.
const SHARPE_ANNUALIZATION: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub sharpe_ratio: f64,
    #[serde(serialize_with = "serialize_profit_factor")]
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub expectancy: f64,
    pub total_pnl: f64,
    pub final_capital: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl Metrics {
    /// All-zero metrics for a run that never simulated a bar.
    pub fn empty(initial_capital: f64) -> Self {
        Metrics {
            total_return: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            sharpe_ratio: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            expectancy: 0.0,
            total_pnl: 0.0,
            final_capital: round_currency(initial_capital),
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
        }
    }

    pub fn compute(portfolio: &Portfolio) -> Self {
        let trades = &portfolio.closed_trades;
        let initial_capital = portfolio.initial_capital;
        let final_capital = portfolio.capital;

        let total_return = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let (winners, losers): (Vec<&Trade>, Vec<&Trade>) =
            trades.iter().partition(|t| t.is_win());

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winners.len() as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let gross_profit: f64 = winners.iter().map(|t| t.pnl).sum();
        let gross_loss: f64 = losers.iter().map(|t| t.pnl).sum::<f64>().abs();
        let profit_factor = if gross_loss > 0.0 {
            round2(gross_profit / gross_loss)
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let largest_win = trades.iter().map(|t| t.pnl).fold(None, max_of);
        let largest_loss = trades.iter().map(|t| t.pnl).fold(None, min_of);

        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let expectancy = if total_trades > 0 {
            total_pnl / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_return: round2(total_return),
            max_drawdown: round2(portfolio.max_drawdown),
            win_rate: round2(win_rate),
            avg_win: round2(mean_pnl_percent(&winners)),
            avg_loss: round2(mean_pnl_percent(&losers)),
            sharpe_ratio: round2(compute_sharpe(trades)),
            profit_factor,
            largest_win: round_currency(largest_win.unwrap_or(0.0)),
            largest_loss: round_currency(largest_loss.unwrap_or(0.0)),
            expectancy: round_currency(expectancy),
            total_pnl: round_currency(total_pnl),
            final_capital: round_currency(final_capital),
            total_trades,
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            max_consecutive_wins: portfolio.max_consecutive_wins,
            max_consecutive_losses: portfolio.max_consecutive_losses,
        }
    }
}

fn max_of(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |a| a.max(v)))
}

fn min_of(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |a| a.min(v)))
}

fn mean_pnl_percent(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl_percent).sum::<f64>() / trades.len() as f64
}

/// Mean over population standard deviation of per-trade percent returns,
/// scaled by `sqrt(12)`. Zero with fewer than two trades or no dispersion.
fn compute_sharpe(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }

    let n = trades.len() as f64;
    let mean = trades.iter().map(|t| t.pnl_percent).sum::<f64>() / n;
    let variance = trades
        .iter()
        .map(|t| (t.pnl_percent - mean).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * SHARPE_ANNUALIZATION.sqrt()
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

fn round_currency(value: f64) -> f64 {
    if value.is_finite() { value.round() } else { 0.0 }
}

fn serialize_profit_factor<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_f64(*value)
    }
}
