use std::fmt;

use serde_json::Value;

use crate::model::Structure;

/// One schema violation inside a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Slash-separated location inside the row; empty for the row itself.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Checks a value against a schema.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema: &Value, value: &Value) -> Vec<ValidationError>;

    /// Errors for one body row under the structure's row schema.
    fn validate_row(&self, structure: &Structure, row: &Value) -> Vec<ValidationError> {
        match structure.row_schema() {
            Some(schema) => self.validate(schema, row),
            None => Vec::new(),
        }
    }
}

/// Validator for the structural subset of JSON Schema used by body schemas:
/// `type`, `items` (single schema or positional list), `properties` and
/// `required`. Other keywords are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema: &Value, value: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check(schema, value, "", &mut errors);
        errors
    }
}

fn check(schema: &Value, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        if !type_allowed(expected, value) {
            errors.push(ValidationError {
                path: path.to_string(),
                message: format!("expected type {expected}, got {}", type_name(value)),
            });
            return;
        }
    }

    if let (Some(items), Value::Array(values)) = (schema.get("items"), value) {
        match items {
            Value::Array(tuple) => {
                for (i, (sub, item)) in tuple.iter().zip(values).enumerate() {
                    check(sub, item, &format!("{path}/{i}"), errors);
                }
            }
            sub => {
                for (i, item) in values.iter().enumerate() {
                    check(sub, item, &format!("{path}/{i}"), errors);
                }
            }
        }
    }

    if let Value::Object(fields) = value {
        if let Some(Value::Object(properties)) = schema.get("properties") {
            for (key, sub) in properties {
                if let Some(field) = fields.get(key) {
                    check(sub, field, &format!("{path}/{key}"), errors);
                }
            }
        }
        if let Some(Value::Array(required)) = schema.get("required") {
            for key in required.iter().filter_map(Value::as_str) {
                if !fields.contains_key(key) {
                    errors.push(ValidationError {
                        path: path.to_string(),
                        message: format!("missing required property {key:?}"),
                    });
                }
            }
        }
    }
}

fn type_allowed(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => type_matches(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| type_matches(name, value)),
        _ => true,
    }
}

fn type_matches(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unknown type names are not enforced.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataFormat;
    use serde_json::json;

    fn tabular() -> Value {
        json!({"type": "array", "items": [
            {"title": "city", "type": "string"},
            {"title": "pop", "type": "integer"}
        ]})
    }

    #[test]
    fn valid_row_has_no_errors() {
        assert!(JsonSchemaValidator.validate(&tabular(), &json!(["toronto", 100])).is_empty());
    }

    #[test]
    fn positional_type_errors() {
        let errors = JsonSchemaValidator.validate(&tabular(), &json!(["toronto", "many"]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/1");
        assert_eq!(
            errors[0].to_string(),
            "/1: expected type \"integer\", got string"
        );
    }

    #[test]
    fn whole_value_type_error_stops_descent() {
        let errors = JsonSchemaValidator.validate(&tabular(), &json!({"city": 1}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "");
    }

    #[test]
    fn type_lists_and_integers() {
        let schema = json!({"type": ["integer", "null"]});
        assert!(JsonSchemaValidator.validate(&schema, &json!(3)).is_empty());
        assert!(JsonSchemaValidator.validate(&schema, &json!(3.0)).is_empty());
        assert!(JsonSchemaValidator.validate(&schema, &Value::Null).is_empty());
        assert_eq!(JsonSchemaValidator.validate(&schema, &json!(3.5)).len(), 1);
    }

    #[test]
    fn object_properties_and_required() {
        let schema = json!({
            "type": "object",
            "properties": {"fruit": {"type": "string"}, "count": {"type": "integer"}},
            "required": ["fruit", "color"]
        });
        let errors = JsonSchemaValidator.validate(&schema, &json!({"fruit": 7, "count": 2}));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "/fruit");
        assert!(errors[1].message.contains("\"color\""));
    }

    #[test]
    fn uniform_items() {
        let schema = json!({"type": "array", "items": {"type": "number"}});
        let errors = JsonSchemaValidator.validate(&schema, &json!([1, "x", 2.5, true]));
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/1", "/3"]);
    }

    #[test]
    fn row_schema_comes_from_structure() {
        let structure = Structure {
            format: Some(DataFormat::Csv),
            schema: Some(json!({"type": "array", "items": tabular()})),
            ..Structure::default()
        };
        assert_eq!(
            JsonSchemaValidator
                .validate_row(&structure, &json!(["a", "b"]))
                .len(),
            1
        );
        let no_schema = Structure::with_format(DataFormat::Csv);
        assert!(JsonSchemaValidator.validate_row(&no_schema, &json!(["a", "b"])).is_empty());
    }
}
