//! Rule evaluation engine.
//!
//! Evaluates `StrategyRule`s against OHLCV bars and a built
//! [`IndicatorCache`].
//!
//! # Evaluation Semantics
//!
//! - An operand that cannot be resolved (unknown name, undefined cell) makes
//!   the rule false; evaluation never fails
//! - `GreaterThan`/`LessThan`: strict comparison at `index`
//! - `Equals`: `|left - right| < 0.001`
//! - `CrossesAbove`/`CrossesBelow`: need both operands defined at `index` and
//!   `index - 1`; always false at index 0
//! - Entry: AND over the entry rules. Exit: first exit rule that holds.

use crate::domain::indicator_cache::IndicatorCache;
use crate::domain::ohlcv::Bar;
use crate::domain::rule::{Condition, Operand, RuleValue, StrategyRule};

pub const EQUALS_TOLERANCE: f64 = 0.001;

pub fn evaluate(rule: &StrategyRule, index: usize, bars: &[Bar], cache: &IndicatorCache) -> bool {
    let Some(left) = rule.left() else {
        return false;
    };
    let Some(left_curr) = resolve_operand(left, bars, cache, index) else {
        return false;
    };
    let Some(right_curr) = resolve_value(&rule.value, bars, cache, index) else {
        return false;
    };

    match rule.condition {
        Condition::GreaterThan => left_curr > right_curr,
        Condition::LessThan => left_curr < right_curr,
        Condition::Equals => (left_curr - right_curr).abs() < EQUALS_TOLERANCE,
        Condition::CrossesAbove | Condition::CrossesBelow => {
            if index == 0 {
                return false;
            }
            let prev = index - 1;
            let (Some(left_prev), Some(right_prev)) = (
                resolve_operand(left, bars, cache, prev),
                resolve_value(&rule.value, bars, cache, prev),
            ) else {
                return false;
            };

            if rule.condition == Condition::CrossesAbove {
                left_prev <= right_prev && left_curr > right_curr
            } else {
                left_prev >= right_prev && left_curr < right_curr
            }
        }
    }
}

/// True when every entry rule holds at `index`. An empty rule set never
/// enters.
pub fn entry_signal(
    rules: &[StrategyRule],
    index: usize,
    bars: &[Bar],
    cache: &IndicatorCache,
) -> bool {
    !rules.is_empty() && rules.iter().all(|r| evaluate(r, index, bars, cache))
}

/// The first exit rule, in declaration order, that holds at `index`.
pub fn exit_signal<'a>(
    rules: &'a [StrategyRule],
    index: usize,
    bars: &[Bar],
    cache: &IndicatorCache,
) -> Option<&'a StrategyRule> {
    rules.iter().find(|r| evaluate(r, index, bars, cache))
}

pub fn resolve_operand(
    operand: Operand,
    bars: &[Bar],
    cache: &IndicatorCache,
    index: usize,
) -> Option<f64> {
    let value = match operand {
        Operand::Open => bars.get(index)?.open,
        Operand::High => bars.get(index)?.high,
        Operand::Low => bars.get(index)?.low,
        Operand::Close => bars.get(index)?.close,
        Operand::Volume => bars.get(index)?.volume,
        Operand::Indicator(key) => cache.value(&key, index)?,
    };
    value.is_finite().then_some(value)
}

fn resolve_value(
    value: &RuleValue,
    bars: &[Bar],
    cache: &IndicatorCache,
    index: usize,
) -> Option<f64> {
    match value {
        RuleValue::Literal(v) => v.is_finite().then_some(*v),
        RuleValue::Indicator(r) => resolve_operand(r.operand()?, bars, cache, index),
    }
}
