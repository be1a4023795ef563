//! TypeScript declaration backend.
//!
//! Produces one exported interface per record as a syntax tree
//! ([`declarations`]) so the consistency check can inspect optional
//! markers and references before anything is rendered.

use crate::GenerateError;
use crate::ir::{Field, RecordDef, Schema, Type};
use crate::options::GenerateOptions;
use crate::traits::{Backend, BackendCategory};
use evalrow_syntax::{Interface, Item, Module, Property, TsType, TypeScriptWriter};

/// Options for TypeScript declaration generation.
#[derive(Debug, Clone, Default)]
pub struct TypeScriptOptions {
    /// Header comment; a default naming the root record is used when empty.
    pub header: Option<String>,
}

/// TypeScript declaration backend.
pub struct TypeScriptBackend;

impl Backend for TypeScriptBackend {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn language(&self) -> &'static str {
        "typescript"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Types
    }

    fn file_name<'a>(&self, options: &'a GenerateOptions) -> &'a str {
        &options.files.declarations
    }

    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
        Ok(generate_typescript_types(schema, &options.typescript))
    }
}

/// Static instance for registry.
pub static TYPESCRIPT_BACKEND: TypeScriptBackend = TypeScriptBackend;

/// Render the declaration file.
pub fn generate_typescript_types(schema: &Schema, options: &TypeScriptOptions) -> String {
    TypeScriptWriter::emit(&declarations(schema, options))
}

/// Build the declaration file as a syntax tree.
pub fn declarations(schema: &Schema, options: &TypeScriptOptions) -> Module {
    let header = options.header.clone().unwrap_or_else(|| {
        format!(
            "TypeScript definitions for {}\n\nGenerated from the evaluation record model. Do not edit by hand.",
            schema.root
        )
    });

    let mut module = Module::new(vec![Item::Comment(header)]);
    for def in &schema.definitions {
        module.push(Item::Interface(interface(def)));
    }
    module
}

fn interface(def: &RecordDef) -> Interface {
    let properties = def.fields.iter().map(property).collect();
    let interface = Interface::new(def.name.clone(), properties);
    match &def.docs {
        Some(docs) => interface.with_docs(docs.clone()),
        None => interface,
    }
}

fn property(field: &Field) -> Property {
    let ty = ts_type(&field.ty);
    let property = if field.required {
        Property::required(field.name.clone(), ty)
    } else {
        Property::optional(field.name.clone(), ty)
    };
    match &field.docs {
        Some(docs) => property.with_docs(docs.clone()),
        None => property,
    }
}

/// TypeScript counterpart of an IR type.
pub fn ts_type(ty: &Type) -> TsType {
    match ty {
        Type::String => TsType::String,
        Type::Integer | Type::Number => TsType::Number,
        Type::Boolean => TsType::Boolean,
        Type::Literal(value) => TsType::StringLiteral(value.clone()),
        Type::Ref(name) => TsType::reference(name.clone()),
        Type::Map(value) => TsType::record(ts_type(value)),
        Type::Array(item) => TsType::array(ts_type(item)),
        Type::Optional(inner) => {
            let mut members = match inner.as_ref() {
                Type::Union(members) => members.iter().map(ts_type).collect(),
                inner => vec![ts_type(inner)],
            };
            members.push(TsType::Null);
            TsType::Union(members)
        }
        Type::Union(members) => TsType::Union(members.iter().map(ts_type).collect()),
        Type::Any => TsType::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample() -> Schema {
        let mut schema = Schema::new("Row");
        schema.add(RecordDef::new(
            "Step",
            vec![Field::required(
                "index",
                Type::Union(vec![Type::Integer, Type::String]),
            )],
        ));
        schema.add(
            RecordDef::new(
                "Row",
                vec![
                    Field::required("steps", Type::array(Type::reference("Step"))),
                    Field::optional("meta", Type::optional(Type::open_map()), Value::Null)
                        .with_docs("Free-form metadata"),
                    Field::optional("valid", Type::Boolean, Value::Bool(true)),
                ],
            )
            .with_docs("A row"),
        );
        schema
    }

    #[test]
    fn one_interface_per_record() {
        let module = declarations(&sample(), &TypeScriptOptions::default());
        let names: Vec<_> = module.interfaces().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Step", "Row"]);
    }

    #[test]
    fn optional_marker_follows_required_flag() {
        let module = declarations(&sample(), &TypeScriptOptions::default());
        let row = module.interface("Row").unwrap();
        assert!(!row.property("steps").unwrap().optional);
        assert!(row.property("meta").unwrap().optional);
        assert!(row.property("valid").unwrap().optional);
    }

    #[test]
    fn nullable_fields_include_null() {
        assert_eq!(
            ts_type(&Type::optional(Type::open_map())),
            TsType::Union(vec![TsType::record(TsType::Any), TsType::Null])
        );
        assert_eq!(
            ts_type(&Type::optional(Type::Union(vec![Type::Integer, Type::String]))),
            TsType::Union(vec![TsType::Number, TsType::String, TsType::Null])
        );
    }

    #[test]
    fn rendered_declarations() {
        let ts = generate_typescript_types(&sample(), &TypeScriptOptions::default());
        assert!(ts.starts_with("/**\n * TypeScript definitions for Row\n"));
        assert!(ts.contains("export interface Step {\n  index: number | string;\n}"));
        assert!(ts.contains("  steps: Step[];\n"));
        assert!(ts.contains("  /** Free-form metadata */\n  meta?: Record<string, any> | null;\n"));
        assert!(ts.contains("  valid?: boolean;\n"));
    }

    #[test]
    fn custom_header() {
        let options = TypeScriptOptions {
            header: Some("Custom".into()),
        };
        let ts = generate_typescript_types(&sample(), &options);
        assert!(ts.starts_with("/**\n * Custom\n */\n"));
    }
}
