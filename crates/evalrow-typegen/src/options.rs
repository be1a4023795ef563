//! Generation options shared by every backend.

use crate::output::{HelperOptions, JsonSchemaOptions, TypeScriptOptions};

/// File names of the generated artifacts, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub json_schema: String,
    pub declarations: String,
    pub helpers: String,
    pub readme: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            json_schema: "evaluation-row.json".into(),
            declarations: "evaluation-row.d.ts".into(),
            helpers: "evaluation-row.ts".into(),
            readme: "README.md".into(),
        }
    }
}

impl ArtifactNames {
    /// Import path of the declaration file (`./evaluation-row.d`).
    pub fn declarations_module(&self) -> String {
        module_path(&self.declarations)
    }

    /// Import path of the helpers file (`./evaluation-row`).
    pub fn helpers_module(&self) -> String {
        module_path(&self.helpers)
    }
}

fn module_path(file: &str) -> String {
    let stem = file.strip_suffix(".ts").unwrap_or(file);
    format!("./{stem}")
}

/// Everything a generation run needs besides the model.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub files: ArtifactNames,
    pub json_schema: JsonSchemaOptions,
    pub typescript: TypeScriptOptions,
    pub helpers: HelperOptions,
}
