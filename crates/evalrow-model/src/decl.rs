//! Explicit structural declarations.
//!
//! Record types register their own field lists here instead of being
//! discovered by reflection. A declaration is written the way the model
//! author thinks about the field (`Option<...>`, a map, a tuple) and is
//! classified later by the introspector, which may reject it.

use serde_json::Value;

/// A record type that declares its own structure.
pub trait Declare {
    /// Build the record's declaration.
    fn declaration() -> RecordDecl;
}

/// Declared structure of one record type.
#[derive(Debug, Clone)]
pub struct RecordDecl {
    /// Record name, unique across the model.
    pub name: &'static str,
    /// Documentation comment.
    pub docs: Option<&'static str>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
    /// Whether properties beyond `fields` are tolerated.
    pub additional_properties: bool,
    /// Structural schema extraction, present when the backing library is
    /// compiled in (`schema` feature).
    pub structural_schema: Option<fn() -> Value>,
}

/// Declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name as it appears on the wire.
    pub name: &'static str,
    /// Declared type.
    pub ty: Declared,
    /// Default value; `None` means the model declares no default.
    pub default: Option<Value>,
    /// Documentation comment.
    pub docs: Option<&'static str>,
}

/// A declared field type.
#[derive(Debug, Clone)]
pub enum Declared {
    // Scalars
    String,
    Integer,
    Number,
    Boolean,
    /// A string constant (e.g. a discriminator value).
    Literal(&'static str),

    /// Another declared record.
    Record(fn() -> RecordDecl),

    // Compound
    Map {
        key: Box<Declared>,
        value: Box<Declared>,
    },
    List(Box<Declared>),
    Optional(Box<Declared>),
    Union(Vec<Declared>),

    /// Unconstrained value.
    Any,

    // Declarable, but with no schema counterpart
    Tuple(Vec<Declared>),
    Bytes,
    Opaque(&'static str),
}

impl Declared {
    pub fn record<T: Declare>() -> Self {
        Self::Record(T::declaration)
    }

    pub fn list(item: Declared) -> Self {
        Self::List(Box::new(item))
    }

    pub fn optional(inner: Declared) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// String-keyed map with a constrained value type.
    pub fn map_of(value: Declared) -> Self {
        Self::Map {
            key: Box::new(Self::String),
            value: Box::new(value),
        }
    }

    /// String-keyed map with unconstrained values (a metadata bag).
    pub fn open_map() -> Self {
        Self::map_of(Self::Any)
    }

    pub fn union(members: Vec<Declared>) -> Self {
        Self::Union(members)
    }

    /// Whether the model marks this type optional.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

impl RecordDecl {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: None,
            fields: Vec::new(),
            additional_properties: true,
            structural_schema: None,
        }
    }

    pub fn with_docs(mut self, docs: &'static str) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Reject properties that are not declared.
    pub fn closed(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    pub fn with_structural_schema(mut self, extract: Option<fn() -> Value>) -> Self {
        self.structural_schema = extract;
        self
    }
}

impl FieldDecl {
    /// A field with no default.
    pub fn required(name: &'static str, ty: Declared) -> Self {
        Self {
            name,
            ty,
            default: None,
            docs: None,
        }
    }

    /// A nullable field defaulting to `null`.
    pub fn optional(name: &'static str, ty: Declared) -> Self {
        Self {
            name,
            ty: Declared::optional(ty),
            default: Some(Value::Null),
            docs: None,
        }
    }

    /// A non-nullable field with an explicit default.
    pub fn defaulted(name: &'static str, ty: Declared, default: Value) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
            docs: None,
        }
    }

    pub fn with_docs(mut self, docs: &'static str) -> Self {
        self.docs = Some(docs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> RecordDecl {
        RecordDecl::new("Leaf").field(FieldDecl::required("id", Declared::String))
    }

    #[test]
    fn optional_field_defaults_to_null() {
        let field = FieldDecl::optional("note", Declared::String);
        assert!(field.ty.is_optional());
        assert_eq!(field.default, Some(Value::Null));
    }

    #[test]
    fn record_reference_is_lazy() {
        let ty = Declared::Record(leaf);
        match ty {
            Declared::Record(declare) => assert_eq!(declare().name, "Leaf"),
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn open_map_has_string_keys() {
        match Declared::open_map() {
            Declared::Map { key, value } => {
                assert!(matches!(*key, Declared::String));
                assert!(matches!(*value, Declared::Any));
            }
            _ => panic!("expected map"),
        }
    }
}
