//! Cross-artifact consistency check.
//!
//! Runs after rendering and before anything is written: the JSON Schema
//! is read back into the IR and compared record by record, and the
//! declaration tree is compared against the same IR. Drift between the
//! emitters fails the run.

use crate::input::parse_json_schema;
use crate::ir::{RecordDef, Schema};
use crate::output::typescript::ts_type;
use evalrow_syntax::Module;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("JSON Schema could not be read back: {0}")]
    Unreadable(String),

    #[error("JSON Schema definitions {found:?} do not match records {expected:?}")]
    Definitions {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("JSON Schema definition `{record}` differs from the model: {detail}")]
    JsonMismatch { record: String, detail: String },

    #[error("JSON Schema top level does not mirror root record `{0}`")]
    RootMismatch(String),

    #[error("TypeScript declarations {found:?} do not match records {expected:?}")]
    Declarations {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("TypeScript `{record}.{field}`: {detail}")]
    DeclarationMismatch {
        record: String,
        field: String,
        detail: String,
    },
}

/// Check the rendered JSON Schema document and declaration tree against
/// the IR they were produced from.
pub fn check(schema: &Schema, json: &Value, declarations: &Module) -> Result<(), ConsistencyError> {
    check_json(schema, json)?;
    check_declarations(schema, declarations)?;
    tracing::debug!(records = schema.definitions.len(), "artifacts consistent");
    Ok(())
}

fn check_json(schema: &Schema, json: &Value) -> Result<(), ConsistencyError> {
    // Inline records would be parsed as unsupported; report them as such.
    let reparsed =
        parse_json_schema(json).map_err(|e| ConsistencyError::Unreadable(e.to_string()))?;

    let expected: Vec<String> = schema.definitions.iter().map(|d| d.name.clone()).collect();
    let mut found: Vec<String> = reparsed.definitions.iter().map(|d| d.name.clone()).collect();
    if reparsed.root != schema.root || sorted(&expected) != sorted(&found) {
        found.sort();
        return Err(ConsistencyError::Definitions { expected, found });
    }

    for def in &schema.definitions {
        let Some(read_back) = reparsed.get(&def.name) else {
            continue;
        };
        if let Some(detail) = record_difference(def, read_back) {
            return Err(ConsistencyError::JsonMismatch {
                record: def.name.clone(),
                detail,
            });
        }
    }

    let root_props = json.get("properties");
    let root_def_props = json
        .get("definitions")
        .and_then(|d| d.get(&schema.root))
        .and_then(|r| r.get("properties"));
    let root_required = json.get("required").cloned().unwrap_or(Value::Array(vec![]));
    let def_required = json
        .get("definitions")
        .and_then(|d| d.get(&schema.root))
        .and_then(|r| r.get("required"))
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    if root_props.is_none() || root_props != root_def_props || root_required != def_required {
        return Err(ConsistencyError::RootMismatch(schema.root.clone()));
    }

    Ok(())
}

fn sorted(names: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = names.iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}

/// First difference between two definitions of the same record.
fn record_difference(expected: &RecordDef, found: &RecordDef) -> Option<String> {
    if expected.docs != found.docs {
        return Some("description differs".into());
    }
    if expected.additional_properties != found.additional_properties {
        return Some("additionalProperties differs".into());
    }
    let expected_names: Vec<&str> = expected.fields.iter().map(|f| f.name.as_str()).collect();
    let found_names: Vec<&str> = found.fields.iter().map(|f| f.name.as_str()).collect();
    if expected_names != found_names {
        return Some(format!("fields {found_names:?}, expected {expected_names:?}"));
    }
    if expected.required() != found.required() {
        return Some(format!(
            "required {:?}, expected {:?}",
            found.required(),
            expected.required()
        ));
    }
    for (want, got) in expected.fields.iter().zip(&found.fields) {
        if want.ty != got.ty {
            return Some(format!("{}: type {:?}, expected {:?}", want.name, got.ty, want.ty));
        }
        if want.default != got.default {
            return Some(format!("{}: default differs", want.name));
        }
        if want.docs != got.docs {
            return Some(format!("{}: description differs", want.name));
        }
    }
    None
}

fn check_declarations(schema: &Schema, module: &Module) -> Result<(), ConsistencyError> {
    let expected: Vec<String> = schema.definitions.iter().map(|d| d.name.clone()).collect();
    let found: Vec<String> = module.interfaces().map(|i| i.name.clone()).collect();
    if expected != found {
        return Err(ConsistencyError::Declarations { expected, found });
    }

    for def in &schema.definitions {
        let Some(interface) = module.interface(&def.name) else {
            continue;
        };
        let mismatch = |field: &str, detail: String| ConsistencyError::DeclarationMismatch {
            record: def.name.clone(),
            field: field.to_string(),
            detail,
        };

        if interface.properties.len() != def.fields.len() {
            return Err(mismatch(
                "*",
                format!(
                    "{} properties for {} fields",
                    interface.properties.len(),
                    def.fields.len()
                ),
            ));
        }
        for (field, property) in def.fields.iter().zip(&interface.properties) {
            if field.name != property.name {
                return Err(mismatch(
                    &field.name,
                    format!("property `{}` in its place", property.name),
                ));
            }
            if property.optional == field.required {
                return Err(mismatch(
                    &field.name,
                    "optional marker disagrees with required flag".into(),
                ));
            }
            if property.ty != ts_type(&field.ty) {
                return Err(mismatch(&field.name, format!("type {:?}", property.ty)));
            }
        }
    }
    Ok(())
}
