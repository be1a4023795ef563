//! JSON Schema to IR parser.
//!
//! Reads back the subset of JSON Schema the generator emits. Anything
//! outside that subset is reported instead of being approximated, so a
//! parsed document can be compared field by field with the model.

use crate::ir::{Field, RecordDef, Schema, Type};
use serde_json::Value;

/// Parse a JSON Schema document into an IR Schema.
///
/// Definitions are read from `definitions` (or `$defs`). The root record
/// is named by `title`; when it has no entry under definitions it is read
/// from the document's own `properties`.
pub fn parse_json_schema(input: &Value) -> Result<Schema, ParseError> {
    let root_name = input
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Root");
    let mut schema = Schema::new(root_name);

    if let Some(defs) = input.get("definitions").or_else(|| input.get("$defs")) {
        let defs = defs
            .as_object()
            .ok_or_else(|| ParseError::Unsupported("definitions must be an object".into()))?;
        for (name, def) in defs {
            schema.add(parse_record(name, def)?);
        }
    }

    if schema.get(root_name).is_none() && input.get("properties").is_some() {
        schema.add(parse_record(root_name, input)?);
    }

    Ok(schema)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported schema construct: {0}")]
    Unsupported(String),
}

fn parse_record(name: &str, schema: &Value) -> Result<RecordDef, ParseError> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(ParseError::Unsupported(format!(
            "definition `{name}` is not an object"
        )));
    }

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (prop_name, prop_schema) in props {
            let ty = parse_type(prop_schema).map_err(|ParseError::Unsupported(what)| {
                ParseError::Unsupported(format!("{name}.{prop_name}: {what}"))
            })?;
            fields.push(Field {
                name: prop_name.clone(),
                ty,
                required: required.contains(&prop_name.as_str()),
                default: prop_schema.get("default").cloned(),
                docs: description(prop_schema),
            });
        }
    }

    Ok(RecordDef {
        name: name.to_string(),
        docs: description(schema),
        fields,
        additional_properties: schema
            .get("additionalProperties")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    })
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(String::from)
}

fn parse_type(schema: &Value) -> Result<Type, ParseError> {
    // Handle $ref
    if let Some(ref_path) = schema.get("$ref").and_then(Value::as_str) {
        let type_name = ref_path.rsplit('/').next().unwrap_or(ref_path);
        return Ok(Type::Ref(type_name.to_string()));
    }

    // Handle const
    if let Some(value) = schema.get("const") {
        return match value {
            Value::String(s) => Ok(Type::Literal(s.clone())),
            other => Err(ParseError::Unsupported(format!("non-string const {other}"))),
        };
    }

    // Handle allOf (single-member wrapper around a $ref)
    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        return match all_of.as_slice() {
            [only] => parse_type(only),
            _ => Err(ParseError::Unsupported("allOf with several members".into())),
        };
    }

    // Handle anyOf; a `null` member makes the rest optional
    if let Some(any_of) = schema.get("anyOf").and_then(Value::as_array) {
        let is_null = |s: &Value| s.get("type").and_then(Value::as_str) == Some("null");
        let has_null = any_of.iter().any(is_null);
        let mut members = any_of
            .iter()
            .filter(|s| !is_null(*s))
            .map(parse_type)
            .collect::<Result<Vec<_>, _>>()?;
        let inner = match members.len() {
            0 => return Err(ParseError::Unsupported("anyOf without members".into())),
            1 => members.remove(0),
            _ => Type::Union(members),
        };
        return Ok(if has_null { Type::optional(inner) } else { inner });
    }

    // Handle type string
    if let Some(type_str) = schema.get("type").and_then(Value::as_str) {
        return parse_type_string(type_str, schema);
    }

    // `{}` accepts anything
    if schema.as_object().is_some_and(|o| {
        o.keys()
            .all(|k| k == "description" || k == "default")
    }) {
        return Ok(Type::Any);
    }

    Err(ParseError::Unsupported(format!("schema {schema}")))
}

fn parse_type_string(type_str: &str, schema: &Value) -> Result<Type, ParseError> {
    Ok(match type_str {
        "string" => Type::String,
        "integer" => Type::Integer,
        "number" => Type::Number,
        "boolean" => Type::Boolean,
        "array" => {
            let items = schema
                .get("items")
                .ok_or_else(|| ParseError::Unsupported("array without items".into()))?;
            Type::array(parse_type(items)?)
        }
        "object" => {
            if schema.get("properties").is_some() {
                return Err(ParseError::Unsupported("inline object definition".into()));
            }
            match schema.get("additionalProperties") {
                Some(value) if value.is_object() => Type::map(parse_type(value)?),
                Some(Value::Bool(false)) => {
                    return Err(ParseError::Unsupported("closed inline object".into()));
                }
                _ => Type::open_map(),
            }
        }
        other => return Err(ParseError::Unsupported(format!("type `{other}`"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_simple_object() {
        let input = json!({
            "type": "object",
            "title": "User",
            "properties": {
                "id": { "type": "string" },
                "age": { "type": "integer", "description": "Years" }
            },
            "required": ["id"]
        });

        let schema = parse_json_schema(&input).unwrap();
        let user = schema.get("User").unwrap();
        assert_eq!(user.required(), vec!["id"]);
        assert_eq!(user.field("age").unwrap().ty, Type::Integer);
        assert_eq!(user.field("age").unwrap().docs.as_deref(), Some("Years"));
        assert!(user.additional_properties);
    }

    #[test]
    fn parse_definitions_and_refs() {
        let input = json!({
            "title": "Row",
            "definitions": {
                "Call": {
                    "type": "object",
                    "properties": { "type": { "type": "string", "const": "function" } },
                    "required": ["type"]
                },
                "Row": {
                    "type": "object",
                    "properties": {
                        "calls": { "type": "array", "items": { "$ref": "#/definitions/Call" } },
                        "primary": {
                            "allOf": [{ "$ref": "#/definitions/Call" }],
                            "description": "First call"
                        }
                    },
                    "required": ["calls", "primary"]
                }
            }
        });

        let schema = parse_json_schema(&input).unwrap();
        assert_eq!(schema.names(), vec!["Call", "Row"]);
        let call = schema.get("Call").unwrap();
        assert_eq!(call.field("type").unwrap().ty, Type::Literal("function".into()));
        let row = schema.get("Row").unwrap();
        assert_eq!(
            row.field("calls").unwrap().ty,
            Type::array(Type::reference("Call"))
        );
        assert_eq!(row.field("primary").unwrap().ty, Type::reference("Call"));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn parse_nullable_and_unions() {
        let input = json!({
            "title": "Step",
            "type": "object",
            "properties": {
                "index": { "anyOf": [{ "type": "integer" }, { "type": "string" }] },
                "info": {
                    "anyOf": [{ "type": "object" }, { "type": "null" }],
                    "default": null
                },
                "scores": {
                    "type": "object",
                    "additionalProperties": { "type": "number" }
                }
            }
        });

        let schema = parse_json_schema(&input).unwrap();
        let step = schema.get("Step").unwrap();
        assert_eq!(
            step.field("index").unwrap().ty,
            Type::Union(vec![Type::Integer, Type::String])
        );
        let info = step.field("info").unwrap();
        assert_eq!(info.ty, Type::optional(Type::open_map()));
        assert_eq!(info.default, Some(Value::Null));
        assert_eq!(step.field("scores").unwrap().ty, Type::map(Type::Number));
    }

    #[test]
    fn inline_object_is_unsupported() {
        let input = json!({
            "title": "Row",
            "type": "object",
            "properties": {
                "nested": { "type": "object", "properties": { "a": { "type": "string" } } }
            }
        });
        assert!(matches!(
            parse_json_schema(&input),
            Err(ParseError::Unsupported(msg)) if msg.contains("inline object")
        ));
    }
}
