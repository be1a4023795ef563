//! Checks over untyped JSON values.
//!
//! Mirrors the runtime helpers emitted for TypeScript so both ecosystems
//! accept and reject the same documents with the same error text.

use serde_json::Value;

/// Outcome of [`validate_evaluation_row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Error text shared with the generated validator.
pub mod errors {
    pub const NOT_AN_OBJECT: &str = "record: must be an object";

    pub fn not_an_array(field: &str) -> String {
        format!("{field}: must be an array")
    }

    pub fn empty(field: &str) -> String {
        format!("{field}: must not be empty")
    }

    pub fn role_not_string(field: &str, index: usize, role: &str) -> String {
        let (prefix, suffix) = role_not_string_parts(field, role);
        format!("{prefix}{index}{suffix}")
    }

    /// Text around the element index, for validators that splice it in at
    /// runtime.
    pub fn role_not_string_parts(field: &str, role: &str) -> (String, String) {
        (format!("{field}["), format!("].{role}: must be a string"))
    }
}

/// Shallow check: an object whose `messages` is an array of objects with a
/// string `role`.
pub fn is_evaluation_row(value: &Value) -> bool {
    value
        .get("messages")
        .and_then(Value::as_array)
        .is_some_and(|messages| messages.iter().all(has_string_role))
}

fn has_string_role(message: &Value) -> bool {
    message.get("role").is_some_and(Value::is_string)
}

/// Deep check collecting every defect instead of stopping at the first.
pub fn validate_evaluation_row(value: &Value) -> Validation {
    let mut found = Vec::new();

    if !value.is_object() {
        found.push(errors::NOT_AN_OBJECT.to_string());
        return Validation::from_errors(found);
    }

    match value.get("messages").and_then(Value::as_array) {
        None => found.push(errors::not_an_array("messages")),
        Some(messages) => {
            if messages.is_empty() {
                found.push(errors::empty("messages"));
            }
            for (index, message) in messages.iter().enumerate() {
                if !has_string_role(message) {
                    found.push(errors::role_not_string("messages", index, "role"));
                }
            }
        }
    }

    Validation::from_errors(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shallow_accepts_minimal_row() {
        assert!(is_evaluation_row(&json!({ "messages": [{ "role": "user" }] })));
        assert!(is_evaluation_row(&json!({ "messages": [] })));
    }

    #[test]
    fn shallow_rejects_bad_shapes() {
        assert!(!is_evaluation_row(&json!(null)));
        assert!(!is_evaluation_row(&json!([])));
        assert!(!is_evaluation_row(&json!({ "messages": "hi" })));
        assert!(!is_evaluation_row(&json!({ "messages": [{ "role": 3 }] })));
        assert!(!is_evaluation_row(&json!({ "messages": [null] })));
    }

    #[test]
    fn deep_collects_every_error() {
        let report = validate_evaluation_row(&json!({
            "messages": [{ "role": "user" }, { "content": "x" }, 7]
        }));
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "messages[1].role: must be a string".to_string(),
                "messages[2].role: must be a string".to_string(),
            ]
        );
    }

    #[test]
    fn deep_reports_missing_and_empty() {
        let missing = validate_evaluation_row(&json!({}));
        assert_eq!(missing.errors, vec!["messages: must be an array".to_string()]);

        let empty = validate_evaluation_row(&json!({ "messages": [] }));
        assert_eq!(empty.errors, vec!["messages: must not be empty".to_string()]);

        let scalar = validate_evaluation_row(&json!("row"));
        assert_eq!(scalar.errors, vec![errors::NOT_AN_OBJECT.to_string()]);
    }
}
