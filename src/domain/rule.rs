//! Declarative strategy rules.
//!
//! - `StrategyRule`: one `indicator condition value` comparison
//! - `Condition`: the comparison operator
//! - `RuleValue`: right-hand side, either a literal or another indicator
//! - `Operand`: what an indicator name resolves to (a bar field or a cached
//!   indicator series)

use crate::domain::indicator::{IndicatorKey, IndicatorKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    CrossesAbove,
    CrossesBelow,
    GreaterThan,
    LessThan,
    Equals,
}

impl Condition {
    /// Accepts snake_case, camelCase, spaced and symbolic spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "crossesabove" | "crossabove" | "crossover" => Some(Condition::CrossesAbove),
            "crossesbelow" | "crossbelow" | "crossunder" => Some(Condition::CrossesBelow),
            "greaterthan" | "above" | "gt" | ">" => Some(Condition::GreaterThan),
            "lessthan" | "below" | "lt" | "<" => Some(Condition::LessThan),
            "equals" | "equal" | "eq" | "=" | "==" => Some(Condition::Equals),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::CrossesAbove => "crosses above",
            Condition::CrossesBelow => "crosses below",
            Condition::GreaterThan => ">",
            Condition::LessThan => "<",
            Condition::Equals => "==",
        };
        f.write_str(s)
    }
}

/// A named series with an optional period, e.g. `sma` / 50.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
}

impl IndicatorRef {
    pub fn new(name: impl Into<String>, period: Option<usize>) -> Self {
        Self {
            name: name.into(),
            period,
        }
    }

    pub fn operand(&self) -> Option<Operand> {
        resolve_name(&self.name, self.period)
    }
}

impl fmt::Display for IndicatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{}", operand),
            None => write!(f, "{}?", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    Literal(f64),
    Indicator(IndicatorRef),
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Literal(v) => write!(f, "{}", v),
            RuleValue::Indicator(r) => write!(f, "{}", r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRule {
    pub indicator: String,
    pub condition: Condition,
    pub value: RuleValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
}

impl StrategyRule {
    pub fn new(
        indicator: impl Into<String>,
        condition: Condition,
        value: RuleValue,
        period: Option<usize>,
    ) -> Self {
        Self {
            indicator: indicator.into(),
            condition,
            value,
            period,
        }
    }

    /// Rule comparing against a constant.
    pub fn literal(
        indicator: impl Into<String>,
        period: Option<usize>,
        condition: Condition,
        value: f64,
    ) -> Self {
        Self::new(indicator, condition, RuleValue::Literal(value), period)
    }

    /// Rule comparing against another indicator.
    pub fn against(
        indicator: impl Into<String>,
        period: Option<usize>,
        condition: Condition,
        other: IndicatorRef,
    ) -> Self {
        Self::new(indicator, condition, RuleValue::Indicator(other), period)
    }

    pub fn left(&self) -> Option<Operand> {
        resolve_name(&self.indicator, self.period)
    }

    /// Every cached series this rule reads, left operand first.
    pub fn indicator_keys(&self) -> Vec<IndicatorKey> {
        let mut keys = Vec::new();
        if let Some(Operand::Indicator(key)) = self.left() {
            keys.push(key);
        }
        if let RuleValue::Indicator(other) = &self.value {
            if let Some(Operand::Indicator(key)) = other.operand() {
                keys.push(key);
            }
        }
        keys
    }
}

impl fmt::Display for StrategyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = IndicatorRef::new(self.indicator.clone(), self.period);
        write!(f, "{} {} {}", left, self.condition, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Open,
    High,
    Low,
    Close,
    Volume,
    Indicator(IndicatorKey),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Open => write!(f, "open"),
            Operand::High => write!(f, "high"),
            Operand::Low => write!(f, "low"),
            Operand::Close => write!(f, "close"),
            Operand::Volume => write!(f, "volume"),
            Operand::Indicator(key) => write!(f, "{}", key),
        }
    }
}

/// Map an indicator name onto a bar field or a cached series.
///
/// Names are case-insensitive. Unknown names resolve to `None`, which every
/// comparison treats as "no signal".
pub fn resolve_name(name: &str, period: Option<usize>) -> Option<Operand> {
    let kind = match name.trim().to_ascii_lowercase().as_str() {
        "price" | "close" => return Some(Operand::Close),
        "open" => return Some(Operand::Open),
        "high" => return Some(Operand::High),
        "low" => return Some(Operand::Low),
        "volume" => return Some(Operand::Volume),
        "sma" => IndicatorKind::Sma,
        "ema" => IndicatorKind::Ema,
        "rsi" => IndicatorKind::Rsi,
        "macd" | "macd_line" => IndicatorKind::MacdLine,
        "macd_signal" => IndicatorKind::MacdSignal,
        "macd_histogram" => IndicatorKind::MacdHistogram,
        "bollinger_upper" => IndicatorKind::BollingerUpper,
        "bollinger_middle" => IndicatorKind::BollingerMiddle,
        "bollinger_lower" => IndicatorKind::BollingerLower,
        "atr" => IndicatorKind::Atr,
        "stochastic_k" => IndicatorKind::StochasticK,
        "stochastic_d" => IndicatorKind::StochasticD,
        "vwap" => IndicatorKind::Vwap,
        "obv" => IndicatorKind::Obv,
        _ => return None,
    };
    Some(Operand::Indicator(IndicatorKey::new(kind, period)))
}
