//! Input format parsers.
//!
//! Each parser reads a schema format and produces an IR [`Schema`](crate::ir::Schema).

pub(crate) mod jsonschema;

pub use jsonschema::{ParseError, parse_json_schema};
