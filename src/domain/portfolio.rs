//! Capital, trade ledger and equity tracking for one backtest run.

use serde::Serialize;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    /// Realized capital; open positions are not deducted.
    pub capital: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub peak_equity: f64,
    /// Largest peak-to-trough decline seen so far, in percent.
    pub max_drawdown: f64,
    pub consecutive_wins: usize,
    pub consecutive_losses: usize,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            capital: initial_capital,
            initial_capital,
            position: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            max_drawdown: 0.0,
            consecutive_wins: 0,
            consecutive_losses: 0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn open(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Realize the open position's P&L and append the trade. Returns `None`
    /// when flat.
    pub fn close(
        &mut self,
        exit_date: &str,
        exit_price: f64,
        reason: super::position::ExitReason,
    ) -> Option<&Trade> {
        let position = self.position.take()?;
        let trade = position.close(exit_date, exit_price, reason);
        self.capital += trade.pnl;
        self.record_streak(trade.is_win());
        self.closed_trades.push(trade);
        self.closed_trades.last()
    }

    fn record_streak(&mut self, won: bool) {
        if won {
            self.consecutive_wins += 1;
            self.consecutive_losses = 0;
            self.max_consecutive_wins = self.max_consecutive_wins.max(self.consecutive_wins);
        } else {
            self.consecutive_losses += 1;
            self.consecutive_wins = 0;
            self.max_consecutive_losses = self.max_consecutive_losses.max(self.consecutive_losses);
        }
    }

    /// Capital plus the open position's unrealized P&L at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.capital
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.unrealized_pnl(price))
    }

    /// Append an equity point and update peak and max drawdown.
    pub fn record_equity(&mut self, date: &str, equity: f64) {
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > 0.0 {
            let drawdown = (self.peak_equity - equity) / self.peak_equity * 100.0;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
        self.equity_curve.push(EquityPoint {
            date: date.to_string(),
            value: equity,
        });
    }
}
