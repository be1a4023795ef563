//! Model introspection: declarations to IR.
//!
//! Walks a root [`Declare`] type, classifies every declared field, and
//! collects the closure of referenced records into a [`Schema`] with
//! dependencies listed before dependents. Anything that cannot be
//! classified precisely fails the run.

use crate::ir::{Field, RecordDef, Schema, SchemaError, Type};
use evalrow_model::{Declare, Declared, RecordDecl};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Errors raised while building the IR from the model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntrospectError {
    #[error("{record}.{field}: cannot classify declared type: {reason}")]
    Unclassifiable {
        record: String,
        field: String,
        reason: String,
    },

    #[error("cyclic record reference: {path}")]
    Cycle { path: String },

    #[error("record name `{0}` is declared twice with different shapes")]
    Conflict(String),

    #[error("{record}: declaration disagrees with the model: {detail}")]
    StructuralMismatch { record: String, detail: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Build the IR for `T` and everything it references.
pub fn introspect<T: Declare>() -> Result<Schema, IntrospectError> {
    introspect_decl(T::declaration())
}

/// Build the IR from an explicit root declaration.
pub fn introspect_decl(root: RecordDecl) -> Result<Schema, IntrospectError> {
    let root_name = root.name;
    let mut walker = Walker::default();
    walker.visit(root)?;

    let schema = Schema {
        root: root_name.to_string(),
        definitions: walker.definitions,
    };
    schema.validate()?;
    tracing::debug!(
        root = %schema.root,
        records = schema.definitions.len(),
        "introspected model"
    );
    Ok(schema)
}

#[derive(Default)]
struct Walker {
    definitions: Vec<RecordDef>,
    /// Index into `definitions` of every finished record.
    finished: HashMap<&'static str, usize>,
    /// Records currently being visited.
    stack: Vec<&'static str>,
    warned_unstructured: bool,
}

impl Walker {
    fn visit(&mut self, decl: RecordDecl) -> Result<(), IntrospectError> {
        if self.stack.contains(&decl.name) {
            let mut path: Vec<&str> = self.stack.clone();
            path.push(decl.name);
            return Err(IntrospectError::Cycle {
                path: path.join(" -> "),
            });
        }

        self.stack.push(decl.name);
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let ty = self.classify(decl.name, field.name, &field.ty, false)?;
            let required = field.default.is_none() && !field.ty.is_optional();
            fields.push(Field {
                name: field.name.to_string(),
                ty,
                required,
                default: if required {
                    None
                } else {
                    Some(field.default.clone().unwrap_or(Value::Null))
                },
                docs: field.docs.map(str::to_string),
            });
        }
        self.stack.pop();

        let def = RecordDef {
            name: decl.name.to_string(),
            docs: decl.docs.map(str::to_string),
            fields,
            additional_properties: decl.additional_properties,
        };

        // A record reached again must classify to exactly the same shape.
        if let Some(&index) = self.finished.get(decl.name) {
            if self.definitions[index] != def {
                return Err(IntrospectError::Conflict(decl.name.to_string()));
            }
            return Ok(());
        }

        self.cross_check(&decl, &def.fields)?;

        self.finished.insert(decl.name, self.definitions.len());
        self.definitions.push(def);
        Ok(())
    }

    fn classify(
        &mut self,
        record: &str,
        field: &str,
        ty: &Declared,
        map_value: bool,
    ) -> Result<Type, IntrospectError> {
        let reject = |reason: &str| IntrospectError::Unclassifiable {
            record: record.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        };

        Ok(match ty {
            Declared::String => Type::String,
            Declared::Integer => Type::Integer,
            Declared::Number => Type::Number,
            Declared::Boolean => Type::Boolean,
            Declared::Literal(value) => Type::Literal((*value).to_string()),
            Declared::Record(declare) => {
                let nested = declare();
                let name = nested.name;
                self.visit(nested)?;
                Type::Ref(name.to_string())
            }
            Declared::Map { key, value } => {
                if !matches!(**key, Declared::String) {
                    return Err(reject("map keys must be strings"));
                }
                Type::map(self.classify(record, field, value, true)?)
            }
            Declared::List(item) => Type::array(self.classify(record, field, item, false)?),
            Declared::Optional(inner) => {
                if inner.is_optional() {
                    return Err(reject("nested optional"));
                }
                Type::optional(self.classify(record, field, inner, map_value)?)
            }
            Declared::Union(members) => match members.as_slice() {
                [] => return Err(reject("empty union")),
                [single] if single.is_optional() => return Err(reject("optional union member")),
                [single] => self.classify(record, field, single, map_value)?,
                _ => {
                    let mut classified = Vec::with_capacity(members.len());
                    for member in members {
                        if member.is_optional() {
                            return Err(reject("optional union member"));
                        }
                        classified.push(self.classify(record, field, member, false)?);
                    }
                    Type::Union(classified)
                }
            },
            Declared::Any if map_value => Type::Any,
            Declared::Any => return Err(reject("unconstrained value outside a mapping")),
            Declared::Tuple(_) => return Err(reject("tuples have no schema counterpart")),
            Declared::Bytes => return Err(reject("binary data has no schema counterpart")),
            Declared::Opaque(name) => {
                return Err(reject(&format!("opaque type `{name}`")));
            }
        })
    }

    /// Compare the declaration with the model's own structural schema.
    fn cross_check(&mut self, decl: &RecordDecl, fields: &[Field]) -> Result<(), IntrospectError> {
        let Some(extract) = decl.structural_schema else {
            if !self.warned_unstructured {
                tracing::warn!(
                    record = decl.name,
                    "structural schema unavailable, skipping model cross-check"
                );
                self.warned_unstructured = true;
            }
            return Ok(());
        };

        let structural = extract();
        let properties: BTreeSet<&str> = structural
            .get("properties")
            .and_then(Value::as_object)
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let declared: BTreeSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        if properties != declared {
            return Err(IntrospectError::StructuralMismatch {
                record: decl.name.to_string(),
                detail: format!("declared fields {declared:?}, model properties {properties:?}"),
            });
        }

        let model_required: BTreeSet<&str> = structural
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let declared_required: BTreeSet<&str> = fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        if model_required != declared_required {
            return Err(IntrospectError::StructuralMismatch {
                record: decl.name.to_string(),
                detail: format!(
                    "declared required {declared_required:?}, model required {model_required:?}"
                ),
            });
        }

        tracing::trace!(record = decl.name, "model cross-check passed");
        Ok(())
    }
}
