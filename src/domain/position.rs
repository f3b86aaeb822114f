//! Open position and closed trade records.

use serde::Serialize;
use std::fmt;

/// Long position held by the simulator. Only one is open at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: String,
    pub entry_price: f64,
    pub quantity: f64,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity
    }

    /// True when `low` reaches `stop_loss_pct` percent below entry.
    pub fn should_stop_loss(&self, low: f64, stop_loss_pct: f64) -> bool {
        low <= self.entry_price * (1.0 - stop_loss_pct / 100.0)
    }

    /// True when `high` reaches `take_profit_pct` percent above entry.
    pub fn should_take_profit(&self, high: f64, take_profit_pct: f64) -> bool {
        high >= self.entry_price * (1.0 + take_profit_pct / 100.0)
    }

    pub fn close(self, exit_date: &str, exit_price: f64, exit_reason: ExitReason) -> Trade {
        let pnl = self.unrealized_pnl(exit_price);
        let pnl_percent = if self.entry_price != 0.0 {
            (exit_price - self.entry_price) / self.entry_price * 100.0
        } else {
            0.0
        };
        Trade {
            entry_date: self.entry_date,
            exit_date: exit_date.to_string(),
            entry_price: self.entry_price,
            exit_price,
            quantity: self.quantity,
            pnl,
            pnl_percent,
            exit_reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExitReason {
    #[serde(rename = "Stop Loss")]
    StopLoss,
    #[serde(rename = "Take Profit")]
    TakeProfit,
    #[serde(rename = "Exit Signal")]
    ExitSignal,
    #[serde(rename = "End of Data")]
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::TakeProfit => "Take Profit",
            ExitReason::ExitSignal => "Exit Signal",
            ExitReason::EndOfData => "End of Data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_date: String,
    pub exit_date: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Break-even trades count as losses.
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
