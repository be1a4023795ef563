//! Intermediate representation for record definitions.
//!
//! The introspector produces this IR once per run; every emitter (JSON
//! Schema, TypeScript declarations, TypeScript helpers, README) and the
//! consistency check read the same value.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// A root record plus the closure of records it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Name of the root record.
    pub root: String,
    /// All record definitions, dependencies before dependents.
    pub definitions: Vec<RecordDef>,
}

/// A named record definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDef {
    /// Record name (e.g., "Message").
    pub name: String,
    /// Documentation comment.
    pub docs: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Whether undeclared properties are tolerated.
    pub additional_properties: bool,
}

/// A field in a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Field name as it appears on the wire.
    pub name: String,
    /// Field type.
    pub ty: Type,
    /// Whether the field is required.
    pub required: bool,
    /// Default value; only present on fields that are not required.
    pub default: Option<Value>,
    /// Documentation comment.
    pub docs: Option<String>,
}

/// A field type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    // Primitives
    String,
    Integer,
    Number,
    Boolean,

    /// String constant.
    Literal(String),

    /// Reference to another record definition.
    Ref(String),

    // Compound
    /// String-keyed map; `Map(Any)` is an open metadata bag.
    Map(Box<Type>),
    Array(Box<Type>),
    /// Nullable value.
    Optional(Box<Type>),
    Union(Vec<Type>),

    /// Unconstrained value (map values only).
    Any,
}

/// Structural defect in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{record}.{field} references undefined record `{target}`")]
    UnresolvedReference {
        record: String,
        field: String,
        target: String,
    },

    #[error("record `{0}` is defined more than once")]
    DuplicateDefinition(String),

    #[error("{record}.{field} is declared more than once")]
    DuplicateField { record: String, field: String },

    #[error("{record}.{field} is required but has a default")]
    RequiredWithDefault { record: String, field: String },

    #[error("root record `{0}` is not defined")]
    MissingRoot(String),
}

impl Schema {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            definitions: Vec::new(),
        }
    }

    pub fn add(&mut self, def: RecordDef) {
        self.definitions.push(def);
    }

    pub fn get(&self, name: &str) -> Option<&RecordDef> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn root_def(&self) -> Option<&RecordDef> {
        self.get(&self.root)
    }

    /// Record names in definition order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Check that the schema is closed and well-formed: every reference
    /// resolves to exactly one definition, the root exists, and required
    /// fields carry no default.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for def in &self.definitions {
            if !names.insert(def.name.as_str()) {
                return Err(SchemaError::DuplicateDefinition(def.name.clone()));
            }
        }
        if !names.contains(self.root.as_str()) {
            return Err(SchemaError::MissingRoot(self.root.clone()));
        }

        for def in &self.definitions {
            let mut fields = HashSet::new();
            for field in &def.fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        record: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.required && field.default.is_some() {
                    return Err(SchemaError::RequiredWithDefault {
                        record: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
                for target in field.ty.references() {
                    if !names.contains(target) {
                        return Err(SchemaError::UnresolvedReference {
                            record: def.name.clone(),
                            field: field.name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl RecordDef {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            docs: None,
            fields,
            additional_properties: true,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields, in declaration order.
    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Records referenced by this record's fields, first use first.
    pub fn references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for target in self.fields.iter().flat_map(|f| f.ty.references()) {
            if !out.contains(&target) {
                out.push(target);
            }
        }
        out
    }
}

impl Field {
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            docs: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: Type, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: Some(default),
            docs: None,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl Type {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    pub fn array(item: Type) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn map(value: Type) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn open_map() -> Self {
        Self::map(Self::Any)
    }

    pub fn optional(inner: Type) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// The type with one level of nullability removed.
    pub fn strip_optional(&self) -> &Type {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Record names referenced anywhere inside this type.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Ref(name) => out.push(name),
            Self::Map(inner) | Self::Array(inner) | Self::Optional(inner) => {
                inner.collect_references(out)
            }
            Self::Union(members) => {
                for member in members {
                    member.collect_references(out);
                }
            }
            Self::String
            | Self::Integer
            | Self::Number
            | Self::Boolean
            | Self::Literal(_)
            | Self::Any => {}
        }
    }
}
