//! The generation pipeline.
//!
//! model -> IR -> consistency check -> every registered backend. All
//! artifacts are rendered in memory; nothing here touches the filesystem.

use crate::GenerateError;
use crate::consistency;
use crate::introspect::introspect;
use crate::ir::Schema;
use crate::options::GenerateOptions;
use crate::output::jsonschema::json_schema;
use crate::output::typescript::declarations;
use crate::registry::backends;
use evalrow_model::Declare;

/// One rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Backend that produced it.
    pub backend: &'static str,
    /// File name relative to the output directory.
    pub file_name: String,
    pub contents: String,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The IR every artifact was produced from.
    pub schema: Schema,
    /// Artifacts in registry order.
    pub artifacts: Vec<Artifact>,
}

impl Generation {
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

/// Introspect `T` and render every artifact.
pub fn generate<T: Declare>(options: &GenerateOptions) -> Result<Generation, GenerateError> {
    let schema = introspect::<T>()?;
    generate_from_schema(schema, options)
}

/// Render every artifact from an already-built IR.
pub fn generate_from_schema(
    schema: Schema,
    options: &GenerateOptions,
) -> Result<Generation, GenerateError> {
    schema.validate()?;

    consistency::check(
        &schema,
        &json_schema(&schema, &options.json_schema),
        &declarations(&schema, &options.typescript),
    )?;

    let mut artifacts = Vec::new();
    for backend in backends() {
        let contents = backend.generate(&schema, options)?;
        let file_name = backend.file_name(options).to_string();
        tracing::debug!(
            backend = backend.name(),
            file = %file_name,
            bytes = contents.len(),
            "rendered artifact"
        );
        artifacts.push(Artifact {
            backend: backend.name(),
            file_name,
            contents,
        });
    }

    Ok(Generation { schema, artifacts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, RecordDef, Type};
    use evalrow_model::EvaluationRow;

    #[test]
    fn renders_four_artifacts() {
        let generation = generate::<EvaluationRow>(&GenerateOptions::default()).unwrap();
        let names: Vec<_> = generation
            .artifacts
            .iter()
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "evaluation-row.json",
                "evaluation-row.d.ts",
                "evaluation-row.ts",
                "README.md"
            ]
        );
    }

    #[test]
    fn unresolved_schema_fails_before_rendering() {
        let mut schema = Schema::new("Row");
        schema.add(RecordDef::new(
            "Row",
            vec![Field::required("next", Type::reference("Missing"))],
        ));
        assert!(matches!(
            generate_from_schema(schema, &GenerateOptions::default()),
            Err(GenerateError::Schema(_))
        ));
    }

    #[test]
    fn helper_shape_error_fails_the_run() {
        let mut schema = Schema::new("Row");
        schema.add(RecordDef::new(
            "Row",
            vec![Field::required("items", Type::array(Type::String))],
        ));
        assert!(matches!(
            generate_from_schema(schema, &GenerateOptions::default()),
            Err(GenerateError::Helpers(_))
        ));
    }
}
