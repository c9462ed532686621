//! Minimal input-schema validation.
//!
//! Validates tool inputs against the object-schema subset tools declare:
//! a top-level `type`, per-property `type` entries, and a `required` list.
//! Anything beyond that subset is accepted as-is.

use serde_json::Value;

/// Validate `input` against `schema`.
///
/// Returns the list of violations; empty means valid.
pub fn validate(schema: &Value, input: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !type_matches(expected, input) {
            violations.push(format!("input is not of type '{expected}'"));
            return violations;
        }
    }

    let Some(object) = input.as_object() else {
        return violations;
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                violations.push(format!("missing required property '{name}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop_schema) in properties {
            let Some(value) = object.get(name) else { continue };
            if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
                if !type_matches(expected, value) {
                    violations.push(format!("property '{name}' is not of type '{expected}'"));
                }
            }
        }
    }

    violations
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}
