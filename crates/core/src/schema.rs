//! Argument validation against a tool's JSON-Schema parameter object.
//!
//! Only the subset the tools actually declare is understood: a flat object
//! with typed `properties`, a `required` list and per-property `default`s.

use serde_json::{Map, Value};
use crate::error::ToolError;

/// Validate `arguments` against `schema` and fill in declared defaults.
///
/// A `null` payload is treated as an empty object.
pub fn prepare_arguments(tool_name: &str, schema: &Value, arguments: Value) -> Result<Value, ToolError> {
    let mut args = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(ToolError::invalid(
                tool_name,
                format!("expected a JSON object, got {}", type_name(&other)),
            ));
        }
    };

    let properties = schema.get("properties").and_then(Value::as_object);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if args.get(name).is_none_or(Value::is_null) {
                return Err(ToolError::invalid(
                    tool_name,
                    format!("missing required argument '{name}'"),
                ));
            }
        }
    }

    let Some(properties) = properties else {
        return Ok(Value::Object(args));
    };

    // Explicit nulls for optional arguments mean "use the default".
    args.retain(|_, v| !v.is_null());

    for key in args.keys() {
        if !properties.contains_key(key) {
            return Err(ToolError::invalid(tool_name, format!("unexpected argument '{key}'")));
        }
    }

    for (name, prop) in properties {
        match args.get(name) {
            Some(value) => {
                if let Some(expected) = prop.get("type").and_then(Value::as_str) {
                    if !matches_type(value, expected) {
                        return Err(ToolError::invalid(
                            tool_name,
                            format!("argument '{name}' must be {expected}, got {}", type_name(value)),
                        ));
                    }
                }
            }
            None => {
                if let Some(default) = prop.get("default") {
                    args.insert(name.clone(), default.clone());
                }
            }
        }
    }

    Ok(Value::Object(args))
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        // Models routinely send 5.0 for an integer parameter.
        "integer" => value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
