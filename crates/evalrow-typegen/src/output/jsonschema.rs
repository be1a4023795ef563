//! JSON Schema backend.
//!
//! Emits a single draft-07 document: every record under `definitions`,
//! referenced by `#/definitions/<Name>` pointers, with the root record's
//! properties repeated at the top level.

use crate::GenerateError;
use crate::ir::{Field, RecordDef, Schema, Type};
use crate::options::GenerateOptions;
use crate::traits::{Backend, BackendCategory};
use serde_json::{Map, Value, json};

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Options for JSON Schema generation.
#[derive(Debug, Clone)]
pub struct JsonSchemaOptions {
    /// `$schema` dialect URI.
    pub draft: String,
    /// `$id` of the document.
    pub id: String,
    /// Top-level description; falls back to the root record's docs.
    pub description: Option<String>,
}

impl Default for JsonSchemaOptions {
    fn default() -> Self {
        Self {
            draft: DRAFT_07.to_string(),
            id: "https://eval-protocol.com/schema/evaluation-row.json".to_string(),
            description: Some(
                "Model Context Protocol compatible schema for evaluation data".to_string(),
            ),
        }
    }
}

/// JSON Schema backend.
pub struct JsonSchemaBackend;

impl Backend for JsonSchemaBackend {
    fn name(&self) -> &'static str {
        "json-schema"
    }

    fn language(&self) -> &'static str {
        "json"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Schema
    }

    fn file_name<'a>(&self, options: &'a GenerateOptions) -> &'a str {
        &options.files.json_schema
    }

    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
        Ok(generate_json_schema(schema, &options.json_schema))
    }
}

/// Static instance for registry.
pub static JSON_SCHEMA_BACKEND: JsonSchemaBackend = JsonSchemaBackend;

/// Pointer used for references between records.
pub fn definition_pointer(name: &str) -> String {
    format!("#/definitions/{name}")
}

/// Pretty-printed JSON with a trailing newline.
pub fn render(document: &Value) -> String {
    format!("{document:#}\n")
}

/// Render the JSON Schema artifact.
pub fn generate_json_schema(schema: &Schema, options: &JsonSchemaOptions) -> String {
    render(&json_schema(schema, options))
}

/// Build the JSON Schema document for `schema`.
pub fn json_schema(schema: &Schema, options: &JsonSchemaOptions) -> Value {
    let mut definitions = Map::new();
    for def in &schema.definitions {
        definitions.insert(def.name.clone(), record_schema(def));
    }

    let mut doc = Map::new();
    doc.insert("$schema".into(), Value::from(options.draft.as_str()));
    doc.insert("$id".into(), Value::from(options.id.as_str()));
    doc.insert("title".into(), Value::from(schema.root.as_str()));

    let root = schema.root_def();
    let description = options
        .description
        .clone()
        .or_else(|| root.and_then(|r| r.docs.clone()));
    if let Some(description) = description {
        doc.insert("description".into(), Value::from(description));
    }
    doc.insert("type".into(), Value::from("object"));
    doc.insert("definitions".into(), Value::Object(definitions));

    if let Some(root) = root {
        doc.insert("properties".into(), Value::Object(properties(root)));
        let required = root.required();
        if !required.is_empty() {
            doc.insert("required".into(), json!(required));
        }
        doc.insert(
            "additionalProperties".into(),
            Value::Bool(root.additional_properties),
        );
    }

    Value::Object(doc)
}

fn record_schema(def: &RecordDef) -> Value {
    let mut out = Map::new();
    out.insert("title".into(), Value::from(def.name.as_str()));
    if let Some(docs) = &def.docs {
        out.insert("description".into(), Value::from(docs.as_str()));
    }
    out.insert("type".into(), Value::from("object"));
    out.insert("properties".into(), Value::Object(properties(def)));
    let required = def.required();
    if !required.is_empty() {
        out.insert("required".into(), json!(required));
    }
    out.insert(
        "additionalProperties".into(),
        Value::Bool(def.additional_properties),
    );
    Value::Object(out)
}

fn properties(def: &RecordDef) -> Map<String, Value> {
    def.fields
        .iter()
        .map(|f| (f.name.clone(), field_schema(f)))
        .collect()
}

fn field_schema(field: &Field) -> Value {
    let mut schema = type_schema(&field.ty);
    if field.docs.is_none() && field.default.is_none() {
        return schema;
    }

    // Siblings of `$ref` are ignored by draft-07 validators.
    if schema.get("$ref").is_some() {
        schema = json!({ "allOf": [schema] });
    }
    if let Value::Object(map) = &mut schema {
        if let Some(docs) = &field.docs {
            map.insert("description".into(), Value::from(docs.as_str()));
        }
        if let Some(default) = &field.default {
            map.insert("default".into(), default.clone());
        }
    }
    schema
}

/// JSON Schema for a single type.
pub fn type_schema(ty: &Type) -> Value {
    match ty {
        Type::String => json!({ "type": "string" }),
        Type::Integer => json!({ "type": "integer" }),
        Type::Number => json!({ "type": "number" }),
        Type::Boolean => json!({ "type": "boolean" }),
        Type::Literal(value) => json!({ "type": "string", "const": value }),
        Type::Ref(name) => json!({ "$ref": definition_pointer(name) }),
        Type::Map(value) => match value.as_ref() {
            Type::Any => json!({ "type": "object" }),
            value => json!({ "type": "object", "additionalProperties": type_schema(value) }),
        },
        Type::Array(item) => json!({ "type": "array", "items": type_schema(item) }),
        Type::Optional(inner) => {
            let mut members: Vec<Value> = match inner.as_ref() {
                Type::Union(members) => members.iter().map(type_schema).collect(),
                inner => vec![type_schema(inner)],
            };
            members.push(json!({ "type": "null" }));
            json!({ "anyOf": members })
        }
        Type::Union(members) => {
            json!({ "anyOf": members.iter().map(type_schema).collect::<Vec<_>>() })
        }
        Type::Any => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        let mut schema = Schema::new("Row");
        schema.add(
            RecordDef::new("Call", vec![Field::required("name", Type::String)])
                .with_docs("A call"),
        );
        schema.add(RecordDef::new(
            "Row",
            vec![
                Field::required("calls", Type::array(Type::reference("Call"))),
                Field::optional(
                    "primary",
                    Type::optional(Type::reference("Call")),
                    Value::Null,
                ),
                Field::required("main", Type::reference("Call")).with_docs("Main call"),
                Field::optional("valid", Type::Boolean, Value::Bool(true)),
            ],
        ));
        schema
    }

    #[test]
    fn document_header() {
        let doc = json_schema(&sample(), &JsonSchemaOptions::default());
        assert_eq!(doc["$schema"], DRAFT_07);
        assert_eq!(doc["title"], "Row");
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["required"], json!(["calls", "main"]));
        assert_eq!(doc["properties"], doc["definitions"]["Row"]["properties"]);
    }

    #[test]
    fn references_use_definition_pointers() {
        let doc = json_schema(&sample(), &JsonSchemaOptions::default());
        let row = &doc["definitions"]["Row"]["properties"];
        assert_eq!(row["calls"]["items"], json!({ "$ref": "#/definitions/Call" }));
        assert_eq!(
            row["primary"],
            json!({
                "anyOf": [{ "$ref": "#/definitions/Call" }, { "type": "null" }],
                "default": null
            })
        );
    }

    #[test]
    fn documented_reference_is_wrapped() {
        let doc = json_schema(&sample(), &JsonSchemaOptions::default());
        assert_eq!(
            doc["definitions"]["Row"]["properties"]["main"],
            json!({ "allOf": [{ "$ref": "#/definitions/Call" }], "description": "Main call" })
        );
    }

    #[test]
    fn defaults_and_empty_required() {
        let doc = json_schema(&sample(), &JsonSchemaOptions::default());
        assert_eq!(
            doc["definitions"]["Row"]["properties"]["valid"],
            json!({ "type": "boolean", "default": true })
        );
        let mut schema = Schema::new("Empty");
        schema.add(RecordDef::new(
            "Empty",
            vec![Field::optional("note", Type::optional(Type::String), Value::Null)],
        ));
        let doc = json_schema(&schema, &JsonSchemaOptions::default());
        assert!(doc["definitions"]["Empty"].get("required").is_none());
    }

    #[test]
    fn description_falls_back_to_root_docs() {
        let mut schema = Schema::new("Call");
        schema.add(RecordDef::new("Call", vec![]).with_docs("A call"));
        let options = JsonSchemaOptions {
            description: None,
            ..Default::default()
        };
        assert_eq!(json_schema(&schema, &options)["description"], "A call");
    }

    #[test]
    fn optional_union_is_flattened() {
        let ty = Type::optional(Type::Union(vec![Type::Integer, Type::String]));
        assert_eq!(
            type_schema(&ty),
            json!({ "anyOf": [{ "type": "integer" }, { "type": "string" }, { "type": "null" }] })
        );
    }

    #[test]
    fn rendered_output_is_stable() {
        let doc = json_schema(&sample(), &JsonSchemaOptions::default());
        let text = render(&doc);
        assert!(text.starts_with("{\n  \"$schema\""));
        assert!(text.ends_with("}\n"));
    }
}
