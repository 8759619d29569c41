//! Schema conformance - validate and coerce a generic JSON value
//!
//! Walks fields in declared order. Required fields must be present and
//! non-null; optional fields fall back to their declared default. Unknown
//! fields are dropped, so the output is the canonical form of the record.

use serde_json::{Map, Value};

use crate::error::{PlotlineError, Result};

use super::{FieldType, Schema};

/// JSON type name of a value (for error messages)
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn mismatch(path: &str, expected: String, actual: &Value) -> PlotlineError {
    PlotlineError::SchemaValidation {
        field: if path.is_empty() { "$".to_string() } else { path.to_string() },
        expected,
        actual: json_type(actual).to_string(),
    }
}

pub(super) fn conform_record(schema: &Schema, value: &Value, path: &str) -> Result<Value> {
    let Value::Object(input) = value else {
        return Err(mismatch(path, format!("record {}", schema.name), value));
    };

    let mut output = Map::new();
    for field in schema.fields {
        let field_path = child_path(path, field.name);
        let conformed = match (input.get(field.name), field.default) {
            (Some(Value::Null) | None, Some(default)) => default.to_value(),
            (None, None) => {
                return Err(PlotlineError::SchemaValidation {
                    field: field_path,
                    expected: field.ty.describe(),
                    actual: "missing".to_string(),
                });
            }
            (Some(raw), _) => conform_field(&field.ty, raw, &field_path)?,
        };
        output.insert(field.name.to_string(), conformed);
    }

    Ok(Value::Object(output))
}

fn conform_field(ty: &FieldType, value: &Value, path: &str) -> Result<Value> {
    match ty {
        FieldType::String => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(mismatch(path, ty.describe(), other)),
        },
        FieldType::Integer => coerce_integer(value)
            .map(Value::from)
            .ok_or_else(|| mismatch(path, ty.describe(), value)),
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(mismatch(path, ty.describe(), other)),
        },
        FieldType::Record(schema) => conform_record(schema, value, path),
        FieldType::List(inner) => {
            let Value::Array(items) = value else {
                return Err(mismatch(path, ty.describe(), value));
            };
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| conform_field(inner, item, &format!("{}[{}]", path, idx)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

/// Integers, whole floats (`2.0`) and numeric strings (`"2"`)
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
