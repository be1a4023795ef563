//! Output backends for artifact generation.
//!
//! Each backend takes an IR [`Schema`](crate::ir::Schema) and produces one
//! artifact. All backends implement the [`Backend`](crate::traits::Backend)
//! trait for uniform access via the registry.

// JSON Schema
pub mod jsonschema;

pub use jsonschema::{JsonSchemaBackend, JsonSchemaOptions, generate_json_schema};

// TypeScript declarations
pub mod typescript;

pub use typescript::{TypeScriptBackend, TypeScriptOptions, generate_typescript_types};

// TypeScript runtime helpers
pub mod helpers;

pub use helpers::{HelperError, HelperOptions, HelpersBackend, generate_helpers};

// README
pub mod readme;

pub use readme::{ReadmeBackend, generate_readme};
