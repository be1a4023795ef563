//! Configuration system for evalrow-schema.
//!
//! Loads config from:
//! 1. Global: ~/.config/evalrow/config.toml
//! 2. Per-project: evalrow.toml in the working directory (overrides global),
//!    or the file given with `--config`
//!
//! Command-line flags override both.
//!
//! Example evalrow.toml:
//! ```toml
//! [output]
//! dir = "schema"
//! helpers = "evaluation-row.ts"
//!
//! [schema]
//! id = "https://example.com/schema/evaluation-row.json"
//!
//! [log]
//! level = "info"
//! ```

use anyhow::Context;
use evalrow_typegen::GenerateOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Artifact locations.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Target directory (default: `schema`).
    pub dir: Option<PathBuf>,
    pub json: Option<String>,
    pub declarations: Option<String>,
    pub helpers: Option<String>,
    pub readme: Option<String>,
}

/// JSON Schema document metadata.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    pub id: Option<String>,
    pub draft: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset (default: `warn`).
    pub level: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EvalrowConfig {
    pub output: OutputConfig,
    pub schema: SchemaConfig,
    pub log: LogConfig,
    /// Files merged into this config, lowest precedence first.
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

impl EvalrowConfig {
    /// Per-project config file name.
    pub const FILE_NAME: &'static str = "evalrow.toml";

    /// Load configuration for a project rooted at `root`.
    ///
    /// `explicit` replaces the per-project file and must exist.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_layers(Self::global_config_path().as_deref(), root, explicit)
    }

    fn load_layers(
        global: Option<&Path>,
        root: &Path,
        explicit: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = global {
            if global_path.exists() {
                config = config.merge_file(global_path)?;
            }
        }

        // Load per-project config (overrides global)
        match explicit {
            Some(path) => config = config.merge_file(path)?,
            None => {
                let project_path = root.join(Self::FILE_NAME);
                if project_path.exists() {
                    config = config.merge_file(&project_path)?;
                }
            }
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("evalrow").join("config.toml"))
    }

    /// Load config from a file path.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    fn merge_file(self, path: &Path) -> anyhow::Result<Self> {
        let mut merged = self.merge(Self::load_file(path)?);
        merged.sources.push(path.to_path_buf());
        Ok(merged)
    }

    /// Merge another config into this one; keys set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            output: OutputConfig {
                dir: other.output.dir.or(self.output.dir),
                json: other.output.json.or(self.output.json),
                declarations: other.output.declarations.or(self.output.declarations),
                helpers: other.output.helpers.or(self.output.helpers),
                readme: other.output.readme.or(self.output.readme),
            },
            schema: SchemaConfig {
                id: other.schema.id.or(self.schema.id),
                draft: other.schema.draft.or(self.schema.draft),
                description: other.schema.description.or(self.schema.description),
            },
            log: LogConfig {
                level: other.log.level.or(self.log.level),
            },
            sources: self.sources,
        }
    }

    /// Directory the artifacts are written to.
    pub fn out_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("schema"))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("warn")
    }

    /// Generation options with configured values applied over the defaults.
    pub fn generate_options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::default();
        let files = &mut options.files;
        if let Some(json) = &self.output.json {
            files.json_schema = json.clone();
        }
        if let Some(declarations) = &self.output.declarations {
            files.declarations = declarations.clone();
        }
        if let Some(helpers) = &self.output.helpers {
            files.helpers = helpers.clone();
        }
        if let Some(readme) = &self.output.readme {
            files.readme = readme.clone();
        }

        let json_schema = &mut options.json_schema;
        if let Some(id) = &self.schema.id {
            json_schema.id = id.clone();
        }
        if let Some(draft) = &self.schema.draft {
            json_schema.draft = draft.clone();
        }
        if let Some(description) = &self.schema.description {
            json_schema.description = Some(description.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let dir = TempDir::new().unwrap();
        let config = EvalrowConfig::load_layers(None, dir.path(), None).unwrap();
        assert_eq!(config, EvalrowConfig::default());
        assert!(config.sources.is_empty());
        assert_eq!(config.out_dir(), PathBuf::from("schema"));
        assert_eq!(config.log_level(), "warn");
        let options = config.generate_options();
        assert_eq!(options.files.json_schema, "evaluation-row.json");
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            EvalrowConfig::FILE_NAME,
            r#"
[output]
dir = "generated"
helpers = "row.ts"

[schema]
id = "https://example.com/row.json"
"#,
        );

        let config = EvalrowConfig::load_layers(None, dir.path(), None).unwrap();
        assert_eq!(config.out_dir(), PathBuf::from("generated"));
        let options = config.generate_options();
        assert_eq!(options.files.helpers, "row.ts");
        assert_eq!(options.files.declarations, "evaluation-row.d.ts");
        assert_eq!(options.json_schema.id, "https://example.com/row.json");
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[output]\ndir = \"from-global\"\n\n[log]\nlevel = \"debug\"\n",
        );
        write(
            dir.path(),
            EvalrowConfig::FILE_NAME,
            "[output]\ndir = \"from-project\"\n",
        );

        let config = EvalrowConfig::load_layers(Some(&global), dir.path(), None).unwrap();
        assert_eq!(config.out_dir(), PathBuf::from("from-project"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(
            config.sources,
            vec![global, dir.path().join(EvalrowConfig::FILE_NAME)]
        );
    }

    #[test]
    fn test_explicit_config_replaces_project() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            EvalrowConfig::FILE_NAME,
            "[output]\ndir = \"from-project\"\n",
        );
        let explicit = write(dir.path(), "other.toml", "[output]\nreadme = \"SCHEMA.md\"\n");

        let config =
            EvalrowConfig::load_layers(None, dir.path(), Some(explicit.as_path())).unwrap();
        assert_eq!(config.out_dir(), PathBuf::from("schema"));
        assert_eq!(config.generate_options().files.readme, "SCHEMA.md");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(EvalrowConfig::load_layers(None, dir.path(), Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), EvalrowConfig::FILE_NAME, "[output]\nfolder = \"x\"\n");
        let err = EvalrowConfig::load_layers(None, dir.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config"));
    }
}
