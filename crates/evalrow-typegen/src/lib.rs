//! Schema and TypeScript generation for evaluation records.
//!
//! `evalrow-typegen` turns the canonical record model into the artifacts
//! shipped to other ecosystems: a JSON Schema document, TypeScript
//! declarations, TypeScript runtime helpers and a README.
//!
//! # Architecture
//!
//! ```text
//! Model              IR                Output Backends
//! ─────────     ─────────────     ────────────────────────
//!                               ┌─> JSON Schema (draft-07)
//! Declare  ─> Schema (ir.rs) ───┼─> TypeScript declarations
//!               │               ├─> TypeScript helpers
//!               │               └─> README
//!               └─ consistency check (JSON Schema read back, declaration tree)
//! ```
//!
//! # Example
//!
//! ```
//! use evalrow_model::EvaluationRow;
//! use evalrow_typegen::{GenerateOptions, generate};
//!
//! let generation = generate::<EvaluationRow>(&GenerateOptions::default()).unwrap();
//! let json = generation.artifact("evaluation-row.json").unwrap();
//! assert!(json.contents.contains("\"#/definitions/Message\""));
//! ```
//!
//! # Using the Backend Registry
//!
//! ```
//! use evalrow_typegen::{GenerateOptions, get_backend, introspect};
//! use evalrow_model::EvaluationRow;
//!
//! let schema = introspect::<EvaluationRow>().unwrap();
//! let backend = get_backend("typescript").unwrap();
//! let ts = backend.generate(&schema, &GenerateOptions::default()).unwrap();
//! assert!(ts.contains("export interface EvaluationRow {"));
//! ```
//!
//! # Feature Flags
//!
//! Backend flags (use `backend-*` prefix, all on by default):
//! - `backend-json-schema` - JSON Schema document
//! - `backend-typescript` - TypeScript interfaces
//! - `backend-helpers` - TypeScript guards, accessors and validator
//! - `backend-readme` - README for the output directory

pub mod consistency;
pub mod generate;
pub mod input;
pub mod introspect;
pub mod ir;
pub mod options;
pub mod output;
pub mod registry;
pub mod traits;

pub use consistency::ConsistencyError;
pub use generate::{Artifact, Generation, generate, generate_from_schema};
pub use input::ParseError;
pub use introspect::{IntrospectError, introspect, introspect_decl};
pub use ir::SchemaError;
pub use options::{ArtifactNames, GenerateOptions};
pub use output::HelperError;
pub use registry::{backend_names, backends, backends_by_category, get_backend, register_backend};
pub use traits::{Backend, BackendCategory};

/// Any failure of a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("introspection failed: {0}")]
    Introspect(#[from] IntrospectError),

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("generated artifacts disagree: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("cannot derive helpers: {0}")]
    Helpers(#[from] HelperError),
}
