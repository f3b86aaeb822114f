//! Normalizes loosely-typed JSON strategy definitions into [`StrategyConfig`].
//!
//! Strategy JSON arrives from several authoring tools, so the parser accepts:
//!
//! - rule lists under `entryRules` / `entry_rules` / `entry` (and the exit
//!   equivalents), either as a bare array or wrapped in `{"conditions": [...]}`
//! - conditions in any spelling [`Condition::parse`] understands
//! - values as numbers, numeric strings, bare indicator names or
//!   `{"name": ..., "period": ...}` objects
//!
//! Parsing never fails. Malformed rules are dropped with a warning and a
//! strategy with no usable rules at all gets the mean-reversion defaults.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::rule::{Condition, IndicatorRef, RuleValue, StrategyRule};
use super::strategy::{
    PositionSizing, RiskLimits, SizingType, StrategyConfig, default_entry_rules,
    default_exit_rules,
};

const ENTRY_KEYS: [&str; 3] = ["entryRules", "entry_rules", "entry"];
const EXIT_KEYS: [&str; 3] = ["exitRules", "exit_rules", "exit"];

pub fn parse_strategy(value: &Value) -> StrategyConfig {
    let Some(root) = value.as_object() else {
        warn!("strategy definition is not a JSON object, using default rules");
        return StrategyConfig::default_rules();
    };

    let mut entry_rules = parse_rule_list(root, &ENTRY_KEYS);
    let mut exit_rules = parse_rule_list(root, &EXIT_KEYS);

    if entry_rules.is_empty() && exit_rules.is_empty() {
        debug!("no usable rules, injecting defaults");
        entry_rules = default_entry_rules();
        exit_rules = default_exit_rules();
    }

    StrategyConfig {
        entry_rules,
        exit_rules,
        position_sizing: field(root, &["positionSizing", "position_sizing"])
            .and_then(parse_position_sizing),
        risk_limits: field(root, &["riskLimits", "risk_limits"]).and_then(parse_risk_limits),
    }
}

/// First present, non-null value among `keys`.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn parse_rule_list(root: &Map<String, Value>, keys: &[&str]) -> Vec<StrategyRule> {
    let Some(raw) = field(root, keys) else {
        return Vec::new();
    };

    let items = match raw {
        Value::Array(items) => items,
        Value::Object(wrapper) => match wrapper.get("conditions") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(key = keys[0], "rule list object has no conditions array");
                return Vec::new();
            }
        },
        _ => {
            warn!(key = keys[0], "rule list is neither an array nor an object");
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let rule = parse_rule(item);
            if rule.is_none() {
                warn!(list = keys[0], index = i, rule = %item, "skipping malformed rule");
            }
            rule
        })
        .collect()
}

/// Parse one rule object. `None` when the indicator, condition or value is
/// missing or unintelligible.
pub fn parse_rule(item: &Value) -> Option<StrategyRule> {
    let object = item.as_object()?;

    let indicator = field(object, &["indicator", "left"])?.as_str()?.trim();
    if indicator.is_empty() {
        return None;
    }
    let condition = Condition::parse(field(object, &["condition", "operator", "op"])?.as_str()?)?;
    let period = field(object, &["period"]).and_then(as_period);
    let value = parse_value(field(object, &["value", "right"])?, object, period)?;

    let rule = StrategyRule::new(indicator, condition, value, period);
    if rule.left().is_none() {
        warn!(indicator, "unknown indicator, rule will never fire");
    }
    Some(rule)
}

fn parse_value(
    raw: &Value,
    rule: &Map<String, Value>,
    rule_period: Option<usize>,
) -> Option<RuleValue> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(RuleValue::Literal),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(v) = s.parse::<f64>() {
                return v.is_finite().then_some(RuleValue::Literal(v));
            }
            // a bare name inherits the rule's period unless one is given
            let period = field(rule, &["valuePeriod", "value_period"])
                .and_then(as_period)
                .or(rule_period);
            Some(RuleValue::Indicator(IndicatorRef::new(s, period)))
        }
        Value::Object(other) => {
            let name = field(other, &["name", "indicator"])?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let period = field(other, &["period"]).and_then(as_period);
            Some(RuleValue::Indicator(IndicatorRef::new(name, period)))
        }
        _ => None,
    }
}

fn as_period(raw: &Value) -> Option<usize> {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .map(|p| p as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(raw: &Value) -> Option<f64> {
    let v = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn parse_position_sizing(raw: &Value) -> Option<PositionSizing> {
    let parsed = raw.as_object().and_then(|object| {
        let kind = field(object, &["type", "sizingType", "sizing_type"])?.as_str()?;
        let sizing_type = match kind.trim().to_lowercase().as_str() {
            "fixed" => SizingType::Fixed,
            "percentage" | "percent" | "pct" => SizingType::Percentage,
            _ => return None,
        };
        let value = as_number(field(object, &["value", "amount"])?)?;
        Some(PositionSizing { sizing_type, value })
    });

    if parsed.is_none() {
        warn!(sizing = %raw, "ignoring malformed position sizing");
    }
    parsed
}

fn parse_risk_limits(raw: &Value) -> Option<RiskLimits> {
    let Some(object) = raw.as_object() else {
        warn!(risk = %raw, "ignoring malformed risk limits");
        return None;
    };

    Some(RiskLimits {
        stop_loss: positive(object, &["stopLoss", "stop_loss"]),
        take_profit: positive(object, &["takeProfit", "take_profit"]),
        max_position_size: positive(object, &["maxPositionSize", "max_position_size"]),
    })
}

/// Zero or negative thresholds count as unset.
fn positive(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(object, keys).and_then(as_number).filter(|v| *v > 0.0)
}
