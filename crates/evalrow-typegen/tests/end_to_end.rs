//! Whole-pipeline tests: model in, rendered artifacts out.

use evalrow_model::{Declare, Declared, EvaluationRow, FieldDecl, RecordDecl};
use evalrow_syntax::TsType;
use evalrow_typegen::output::typescript::{TypeScriptOptions, declarations};
use evalrow_typegen::{GenerateOptions, generate, introspect};
use serde_json::{Value, json};
use std::collections::BTreeSet;

struct Turn;
struct Verdict;
struct Row;

impl Declare for Turn {
    fn declaration() -> RecordDecl {
        RecordDecl::new("Message")
            .field(FieldDecl::required("role", Declared::String))
            .field(FieldDecl::optional("content", Declared::String))
    }
}

impl Declare for Verdict {
    fn declaration() -> RecordDecl {
        RecordDecl::new("Result").field(FieldDecl::required("score", Declared::Number))
    }
}

impl Declare for Row {
    fn declaration() -> RecordDecl {
        RecordDecl::new("Row")
            .field(FieldDecl::required(
                "messages",
                Declared::list(Declared::record::<Turn>()),
            ))
            .field(FieldDecl::optional("result", Declared::record::<Verdict>()))
    }
}

fn json_artifact(options: &GenerateOptions, generation: &evalrow_typegen::Generation) -> Value {
    let artifact = generation
        .artifact(&options.files.json_schema)
        .expect("json artifact");
    serde_json::from_str(&artifact.contents).expect("valid json")
}

#[test]
fn minimal_row_json_schema() {
    let schema = introspect::<Row>().unwrap();
    let options = GenerateOptions::default();
    let doc = evalrow_typegen::output::jsonschema::json_schema(&schema, &options.json_schema);

    assert_eq!(doc["required"], json!(["messages"]));
    assert_eq!(doc["definitions"].as_object().unwrap().len(), 3);
    assert_eq!(
        doc["properties"]["messages"],
        json!({ "type": "array", "items": { "$ref": "#/definitions/Message" } })
    );
    assert_eq!(doc["definitions"]["Message"]["required"], json!(["role"]));
    assert_eq!(
        doc["definitions"]["Message"]["properties"]["content"],
        json!({ "anyOf": [{ "type": "string" }, { "type": "null" }], "default": null })
    );
}

#[test]
fn minimal_row_declarations() {
    let schema = introspect::<Row>().unwrap();
    let module = declarations(&schema, &TypeScriptOptions::default());
    let row = module.interface("Row").unwrap();
    assert!(!row.property("messages").unwrap().optional);
    assert!(row.property("result").unwrap().optional);
    assert_eq!(
        row.property("messages").unwrap().ty,
        TsType::array(TsType::reference("Message"))
    );

    let ts = evalrow_syntax::TypeScriptWriter::emit(&module);
    insta::assert_snapshot!(ts, @r"
    /**
     * TypeScript definitions for Row
     *
     * Generated from the evaluation record model. Do not edit by hand.
     */

    export interface Message {
      role: string;
      content?: string | null;
    }

    export interface Result {
      score: number;
    }

    export interface Row {
      messages: Message[];
      result?: Result | null;
    }
    ");
}

#[test]
fn required_sets_agree_across_artifacts() {
    let options = GenerateOptions::default();
    let generation = generate::<EvaluationRow>(&options).unwrap();
    let doc = json_artifact(&options, &generation);
    let module = declarations(&generation.schema, &options.typescript);

    for def in &generation.schema.definitions {
        let json_required: BTreeSet<&str> = doc["definitions"][&def.name]
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let ir_required: BTreeSet<&str> = def.required().into_iter().collect();
        assert_eq!(json_required, ir_required, "{}", def.name);

        let interface = module.interface(&def.name).unwrap();
        let ts_required: BTreeSet<&str> = interface
            .properties
            .iter()
            .filter(|p| !p.optional)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(ts_required, ir_required, "{}", def.name);
    }
}

#[test]
fn nested_records_are_referenced_not_inlined() {
    let options = GenerateOptions::default();
    let generation = generate::<EvaluationRow>(&options).unwrap();
    let doc = json_artifact(&options, &generation);

    fn count_inline_objects(value: &Value) -> usize {
        match value {
            Value::Object(map) => {
                let here = usize::from(map.contains_key("properties"));
                here + map.values().map(count_inline_objects).sum::<usize>()
            }
            Value::Array(items) => items.iter().map(count_inline_objects).sum(),
            _ => 0,
        }
    }

    for (name, def) in doc["definitions"].as_object().unwrap() {
        for (field, prop) in def["properties"].as_object().unwrap() {
            assert_eq!(count_inline_objects(prop), 0, "{name}.{field} inlines a record");
        }
    }

    let text = &generation.artifact(&options.files.json_schema).unwrap().contents;
    for name in ["Message", "ToolCall", "FunctionCall", "EvaluateResult", "StepOutput"] {
        assert!(text.contains(&format!("\"#/definitions/{name}\"")), "{name}");
    }
}

#[test]
fn helpers_import_the_declaration_file() {
    let options = GenerateOptions::default();
    let generation = generate::<EvaluationRow>(&options).unwrap();
    let helpers = &generation.artifact(&options.files.helpers).unwrap().contents;
    assert!(helpers.contains("from \"./evaluation-row.d\";"));
    assert!(helpers.contains("export function isEvaluationRow(obj: any): obj is EvaluationRow {"));
    assert!(helpers.contains("export function validateEvaluationRow(obj: any): ValidationResult {"));
}

#[test]
fn generation_is_deterministic() {
    let options = GenerateOptions::default();
    let first = generate::<EvaluationRow>(&options).unwrap();
    let second = generate::<EvaluationRow>(&options).unwrap();
    assert_eq!(first.artifacts, second.artifacts);
}
