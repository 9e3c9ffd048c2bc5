//! Parameter validation against a tool's declared schema

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::registry::{ParamKind, ParameterSchema, ParameterSpec, ToolDefinition};

/// Offending field and the expectation it violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument '{field}': {expected}")]
pub struct ValidationError {
    pub field: String,
    pub expected: String,
}

impl ValidationError {
    pub(crate) fn new(field: &str, expected: impl Into<String>) -> Self {
        Self { field: field.to_string(), expected: expected.into() }
    }
}

/// Arguments that passed validation, with defaults filled in and aliases
/// folded onto canonical names. Unknown keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArguments {
    values: Map<String, Value>,
}

impl ValidatedArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }
}

/// Validate `arguments` for `definition`
pub fn validate(
    definition: &ToolDefinition,
    arguments: Map<String, Value>,
) -> Result<ValidatedArguments, ValidationError> {
    definition.schema.validate(arguments)
}

impl ParameterSchema {
    pub fn validate(
        &self,
        mut arguments: Map<String, Value>,
    ) -> Result<ValidatedArguments, ValidationError> {
        for spec in &self.params {
            let supplied = take_supplied(spec, &mut arguments);
            match supplied {
                Some(value) => {
                    let value = check_kind(spec, value)?;
                    check_range(spec, &value)?;
                    arguments.insert(spec.name.to_string(), value);
                }
                None if spec.required => {
                    return Err(ValidationError::new(spec.name, "required parameter is missing"));
                }
                None => {
                    if let Some(default) = &spec.default {
                        arguments.insert(spec.name.to_string(), default.clone());
                    }
                }
            }
        }
        Ok(ValidatedArguments { values: arguments })
    }
}

/// Remove the parameter from `arguments` under its name or first present alias.
/// Explicit nulls count as absent.
fn take_supplied(spec: &ParameterSpec, arguments: &mut Map<String, Value>) -> Option<Value> {
    std::iter::once(spec.name)
        .chain(spec.aliases.iter().copied())
        .find_map(|key| arguments.remove(key).filter(|value| !value.is_null()))
}

fn check_kind(spec: &ParameterSpec, value: Value) -> Result<Value, ValidationError> {
    let mismatch =
        |value: &Value| ValidationError::new(spec.name, format!("expected {}, got {}", spec.kind, describe(value)));

    match spec.kind {
        ParamKind::String if value.is_string() => Ok(value),
        ParamKind::Number if value.is_number() => Ok(value),
        ParamKind::Boolean if value.is_boolean() => Ok(value),
        ParamKind::Integer => as_whole_number(&value).map(|n| json!(n)).ok_or_else(|| mismatch(&value)),
        ParamKind::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => Ok(value),
            _ => Err(mismatch(&value)),
        },
        _ => Err(mismatch(&value)),
    }
}

fn check_range(spec: &ParameterSpec, value: &Value) -> Result<(), ValidationError> {
    let Some(n) = value.as_f64() else {
        return Ok(());
    };
    let below = spec.minimum.is_some_and(|min| n < min);
    let above = spec.maximum.is_some_and(|max| n > max);
    if !below && !above {
        return Ok(());
    }

    let expected = match (spec.minimum, spec.maximum) {
        (Some(min), Some(max)) => format!("expected a value between {} and {}, got {}", min, max, value),
        (Some(min), None) => format!("expected a value of at least {}, got {}", min, value),
        (None, Some(max)) => format!("expected a value of at most {}, got {}", max, value),
        (None, None) => unreachable!("range violation without bounds"),
    };
    Err(ValidationError::new(spec.name, expected))
}

fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(s) => format!("string \"{}\"", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: &[&str] = &["WANT_TO_READ", "READ"];

    fn schema() -> ParameterSchema {
        ParameterSchema::new(vec![
            ParameterSpec::required("id", ParamKind::Integer, "Book id").with_aliases(&["book_id"]),
            ParameterSpec::required("status", ParamKind::Enum(STATUSES), "Status"),
            ParameterSpec::optional("rating", ParamKind::Number, "Rating").with_range(1.0, 5.0),
            ParameterSpec::optional("limit", ParamKind::Integer, "Limit").with_default(json!(10)),
            ParameterSpec::optional("exact", ParamKind::Boolean, "Exact match"),
        ])
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn fills_defaults_and_keeps_unknown_keys() {
        let validated = schema()
            .validate(args(json!({"id": 1, "status": "READ", "extra": "kept"})))
            .unwrap();
        assert_eq!(validated.i64("limit"), Some(10));
        assert_eq!(validated.str("extra"), Some("kept"));
        assert!(validated.get("rating").is_none());
    }

    #[test]
    fn missing_required_parameter_names_the_field() {
        let err = schema().validate(args(json!({"status": "READ"}))).unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.to_string(), "invalid argument 'id': required parameter is missing");
    }

    #[test]
    fn alias_is_folded_onto_canonical_name() {
        let validated = schema().validate(args(json!({"book_id": 42, "status": "READ"}))).unwrap();
        assert_eq!(validated.i64("id"), Some(42));
        assert!(validated.get("book_id").is_none());
    }

    #[test]
    fn integral_floats_are_normalised() {
        let validated = schema().validate(args(json!({"id": 42.0, "status": "READ"}))).unwrap();
        assert_eq!(validated.get("id"), Some(&json!(42)));

        let err = schema().validate(args(json!({"id": 4.5, "status": "READ"}))).unwrap_err();
        assert_eq!(err.field, "id");
    }

    #[test]
    fn wrong_primitive_type_is_rejected() {
        let err = schema().validate(args(json!({"id": "42", "status": "READ"}))).unwrap_err();
        assert_eq!(err.expected, "expected integer, got string \"42\"");

        let err = schema()
            .validate(args(json!({"id": 1, "status": "READ", "exact": "yes"})))
            .unwrap_err();
        assert_eq!(err.field, "exact");
    }

    #[test]
    fn enum_rejects_values_outside_the_set() {
        let err = schema().validate(args(json!({"id": 1, "status": "LOST"}))).unwrap_err();
        assert_eq!(err.field, "status");
        assert!(err.expected.starts_with("expected one of WANT_TO_READ, READ"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(schema().validate(args(json!({"id": 1, "status": "READ", "rating": 5}))).is_ok());
        assert!(schema().validate(args(json!({"id": 1, "status": "READ", "rating": 1}))).is_ok());

        let err = schema()
            .validate(args(json!({"id": 1, "status": "READ", "rating": 6})))
            .unwrap_err();
        assert_eq!(err.expected, "expected a value between 1 and 5, got 6");
    }

    #[test]
    fn explicit_null_counts_as_absent() {
        let validated = schema()
            .validate(args(json!({"id": 1, "status": "READ", "limit": null})))
            .unwrap();
        assert_eq!(validated.i64("limit"), Some(10));
    }

    #[test]
    fn null_canonical_name_falls_through_to_alias() {
        let validated = schema()
            .validate(args(json!({"id": null, "book_id": 7, "status": "READ"})))
            .unwrap();
        assert_eq!(validated.i64("id"), Some(7));
    }

    #[test]
    fn fractional_numbers_pass_range_checks() {
        let validated = schema()
            .validate(args(json!({"id": 1, "status": "READ", "rating": 4.5})))
            .unwrap();
        assert_eq!(validated.f64("rating"), Some(4.5));
    }
}
