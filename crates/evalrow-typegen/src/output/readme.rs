//! README backend.

use crate::GenerateError;
use crate::ir::Schema;
use crate::options::{ArtifactNames, GenerateOptions};
use crate::traits::{Backend, BackendCategory};
use std::fmt::Write;

/// README backend.
pub struct ReadmeBackend;

impl Backend for ReadmeBackend {
    fn name(&self) -> &'static str {
        "readme"
    }

    fn language(&self) -> &'static str {
        "markdown"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Docs
    }

    fn file_name<'a>(&self, options: &'a GenerateOptions) -> &'a str {
        &options.files.readme
    }

    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
        Ok(generate_readme(schema, &options.files))
    }
}

/// Static instance for registry.
pub static README_BACKEND: ReadmeBackend = ReadmeBackend;

/// Render the README describing the other artifacts.
pub fn generate_readme(schema: &Schema, files: &ArtifactNames) -> String {
    let root = &schema.root;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# {root} Schema\n");
    let _ = writeln!(
        out,
        "This directory contains Model Context Protocol compatible schemas for the \
         {root} data structure used in the eval-protocol system.\n"
    );

    out.push_str("## Files\n\n");
    let _ = writeln!(
        out,
        "- `{}`: JSON Schema definition for {root} and related records",
        files.json_schema
    );
    let _ = writeln!(out, "- `{}`: TypeScript type definitions", files.declarations);
    let _ = writeln!(
        out,
        "- `{}`: TypeScript runtime helpers (type guard, accessors, validator)",
        files.helpers
    );
    out.push('\n');

    out.push_str("## Records\n\n");
    out.push_str("| Record | Required fields | Description |\n");
    out.push_str("|---|---|---|\n");
    for def in &schema.definitions {
        let required = def
            .required()
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "| `{}` | {} | {} |",
            def.name,
            if required.is_empty() { "-" } else { required.as_str() },
            def.docs.as_deref().unwrap_or("")
        );
    }
    out.push('\n');

    out.push_str("## Usage\n\n### JSON Schema\n\n");
    out.push_str(
        "The JSON Schema can be used for validation in any JSON Schema compatible system:\n\n",
    );
    let _ = writeln!(
        out,
        r#"```json
{{
  "$schema": "./{json}",
  "messages": [
    {{
      "role": "user",
      "content": "Hello, how can I help?"
    }}
  ],
  "evaluation_result": {{
    "score": 0.85,
    "reason": "Good response quality"
  }}
}}
```
"#,
        json = files.json_schema
    );

    out.push_str("### TypeScript\n\n");
    out.push_str("Import the types and helpers in your TypeScript project:\n\n");
    let module = files.helpers_module();
    let _ = writeln!(
        out,
        r#"```typescript
import {{ {root}, is{root}, validate{root} }} from '{module}';

const evaluation: {root} = {{
  messages: [
    {{ role: 'user', content: 'Hello' }},
    {{ role: 'assistant', content: 'Hi there!' }}
  ],
  evaluation_result: {{
    score: 0.9,
    reason: 'Excellent response'
  }}
}};

// Validate using the type guard
if (is{root}(data)) {{
  console.log('Valid evaluation row');
}}

// Or collect every problem
const {{ valid, errors }} = validate{root}(data);
```
"#
    );

    out.push_str("## Model Context Protocol Integration\n\n");
    out.push_str(
        "These schemas are designed to be compatible with the Model Context Protocol (MCP) \
         and can be used for:\n\n",
    );
    out.push_str("- Tool call validation in MCP servers\n");
    out.push_str("- Data exchange between MCP clients and servers\n");
    out.push_str("- Standardized evaluation data format across different MCP implementations\n\n");

    out.push_str("## Regeneration\n\n");
    out.push_str("These files are generated from the Rust record model. To regenerate them:\n\n");
    out.push_str("```bash\nevalrow-schema\n```\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::introspect;
    use evalrow_model::EvaluationRow;

    #[test]
    fn readme_names_every_artifact() {
        let schema = introspect::<EvaluationRow>().unwrap();
        let files = ArtifactNames::default();
        let readme = generate_readme(&schema, &files);
        assert!(readme.starts_with("# EvaluationRow Schema\n"));
        assert!(readme.contains("- `evaluation-row.json`:"));
        assert!(readme.contains("- `evaluation-row.d.ts`:"));
        assert!(readme.contains("- `evaluation-row.ts`:"));
        assert!(readme.contains("\"$schema\": \"./evaluation-row.json\""));
        assert!(readme.contains("from './evaluation-row';"));
    }

    #[test]
    fn readme_lists_records() {
        let schema = introspect::<EvaluationRow>().unwrap();
        let readme = generate_readme(&schema, &ArtifactNames::default());
        assert!(readme.contains("| `EvaluationRow` | `messages` |"));
        assert!(readme.contains("| `MetricResult` | `is_score_valid`, `score`, `reason` |"));
    }
}
