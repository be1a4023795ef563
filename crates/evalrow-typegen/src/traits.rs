//! Traits for artifact generation backends.

use crate::GenerateError;
use crate::ir::Schema;
use crate::options::GenerateOptions;

/// Category of backend output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCategory {
    /// Machine-readable schema documents.
    Schema,
    /// Pure type definitions (interfaces).
    Types,
    /// Runtime guards and validators.
    Validators,
    /// Human-facing documentation.
    Docs,
}

/// An artifact generation backend.
///
/// Backends transform an IR [`Schema`] into the text of one artifact.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use evalrow_typegen::{Backend, BackendCategory, GenerateError, GenerateOptions};
/// use evalrow_typegen::{ir::Schema, register_backend};
///
/// struct RecordList;
///
/// impl Backend for RecordList {
///     fn name(&self) -> &'static str { "record-list" }
///     fn language(&self) -> &'static str { "text" }
///     fn category(&self) -> BackendCategory { BackendCategory::Docs }
///     fn file_name<'a>(&self, _: &'a GenerateOptions) -> &'a str { "records.txt" }
///     fn generate(&self, schema: &Schema, _: &GenerateOptions) -> Result<String, GenerateError> {
///         Ok(schema.names().join("\n"))
///     }
/// }
///
/// // Register before first use
/// register_backend(&RecordList);
/// ```
pub trait Backend: Send + Sync {
    /// Unique backend identifier (e.g., "json-schema", "typescript").
    fn name(&self) -> &'static str;

    /// Output language (e.g., "json", "typescript", "markdown").
    fn language(&self) -> &'static str;

    /// Category of output.
    fn category(&self) -> BackendCategory;

    /// Artifact file name, relative to the output directory.
    fn file_name<'a>(&self, options: &'a GenerateOptions) -> &'a str;

    /// Generate the artifact text from the IR schema.
    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError>;
}
