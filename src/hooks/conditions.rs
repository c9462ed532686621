//! Condition gating for hook execution.
//!
//! Each hook carries a list of conditions matched against the pipeline data
//! before its handler runs. Every condition must match; an empty list always
//! matches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    /// Field equals the value.
    Equals,
    /// Field does not equal the value (a missing field matches).
    NotEquals,
    /// String field contains the value as a substring, or array field
    /// contains the value as an element.
    Contains,
    /// Numeric field is greater than the value.
    GreaterThan,
    /// Numeric field is less than the value.
    LessThan,
}

/// A single gating condition: a dot-path into the pipeline data, an
/// operator, and a comparison value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookCondition {
    /// Dot-separated path into the data object (e.g. `"request.to_phase"`).
    pub field: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Value to compare against.
    pub value: Value,
}

impl HookCondition {
    /// Create a condition.
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self { field: field.into(), operator, value }
    }

    /// Whether the condition matches the given data.
    pub fn matches(&self, data: &Value) -> bool {
        let field = lookup_path(data, &self.field);

        match self.operator {
            ConditionOperator::Equals => field.is_some_and(|f| f == &self.value),
            ConditionOperator::NotEquals => field.is_none_or(|f| f != &self.value),
            ConditionOperator::Contains => field.is_some_and(|f| contains(f, &self.value)),
            ConditionOperator::GreaterThan => compare(field, &self.value).is_some_and(|o| o.is_gt()),
            ConditionOperator::LessThan => compare(field, &self.value).is_some_and(|o| o.is_lt()),
        }
    }
}

/// Resolve a dot-separated path against a JSON value.
fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn contains(field: &Value, value: &Value) -> bool {
    match field {
        Value::String(s) => value.as_str().is_some_and(|needle| s.contains(needle)),
        Value::Array(items) => items.contains(value),
        _ => false,
    }
}

fn compare(field: Option<&Value>, value: &Value) -> Option<std::cmp::Ordering> {
    let lhs = field?.as_f64()?;
    let rhs = value.as_f64()?;
    lhs.partial_cmp(&rhs)
}
