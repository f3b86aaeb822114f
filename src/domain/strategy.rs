//! Strategy configuration consumed by the simulator.

use crate::domain::indicator::IndicatorKey;
use crate::domain::indicator_cache::required_keys;
use crate::domain::rule::{Condition, IndicatorRef, StrategyRule};
use serde::Serialize;

/// Share of capital committed per entry when no sizing policy is given.
pub const DEFAULT_POSITION_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingType {
    /// `value` is a currency amount per entry.
    Fixed,
    /// `value` is a percentage of current capital per entry.
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSizing {
    #[serde(rename = "type")]
    pub sizing_type: SizingType,
    pub value: f64,
}

/// Percent thresholds. `max_position_size` caps entry notional as a
/// percentage of current capital.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
}

/// Entry fires when **all** entry rules hold; exit fires when **any** exit
/// rule holds.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    pub entry_rules: Vec<StrategyRule>,
    pub exit_rules: Vec<StrategyRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_sizing: Option<PositionSizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_limits: Option<RiskLimits>,
}

impl StrategyConfig {
    /// Mean-reversion defaults: enter on `RSI(14) < 30 AND price > SMA(20)`,
    /// exit on `RSI(14) > 70`.
    pub fn default_rules() -> Self {
        StrategyConfig {
            entry_rules: default_entry_rules(),
            exit_rules: default_exit_rules(),
            position_sizing: None,
            risk_limits: None,
        }
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.risk_limits.and_then(|r| r.stop_loss)
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.risk_limits.and_then(|r| r.take_profit)
    }

    pub fn max_position_size(&self) -> Option<f64> {
        self.risk_limits.and_then(|r| r.max_position_size)
    }

    /// Whole units to buy at `price` with `capital` available. Zero means the
    /// entry is skipped.
    pub fn quantity_for(&self, capital: f64, price: f64) -> f64 {
        if price <= 0.0 || !price.is_finite() {
            return 0.0;
        }

        let budget = match self.position_sizing {
            Some(PositionSizing {
                sizing_type: SizingType::Fixed,
                value,
            }) => value,
            Some(PositionSizing {
                sizing_type: SizingType::Percentage,
                value,
            }) => capital * value / 100.0,
            None => capital * DEFAULT_POSITION_FRACTION,
        };

        let mut quantity = (budget / price).floor();
        if let Some(max_pct) = self.max_position_size() {
            let cap = (capital * max_pct / 100.0 / price).floor();
            quantity = quantity.min(cap);
        }

        if quantity.is_finite() && quantity > 0.0 {
            quantity
        } else {
            0.0
        }
    }

    /// Cache keys a run of this strategy materializes, in display order.
    pub fn required_indicators(&self) -> Vec<IndicatorKey> {
        required_keys(self).into_iter().collect()
    }
}

pub fn default_entry_rules() -> Vec<StrategyRule> {
    vec![
        StrategyRule::literal("rsi", Some(14), Condition::LessThan, 30.0),
        StrategyRule::against(
            "price",
            None,
            Condition::GreaterThan,
            IndicatorRef::new("sma", Some(20)),
        ),
    ]
}

pub fn default_exit_rules() -> Vec<StrategyRule> {
    vec![StrategyRule::literal(
        "rsi",
        Some(14),
        Condition::GreaterThan,
        70.0,
    )]
}
