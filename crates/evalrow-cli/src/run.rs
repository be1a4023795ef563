//! Orchestration: generate in memory, then write or compare.

use crate::config::EvalrowConfig;
use anyhow::Context;
use evalrow_model::EvaluationRow;
use evalrow_typegen::{Generation, generate};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Artifacts written, in generation order.
    Written(Vec<PathBuf>),
    /// `--check`: every artifact on disk matches.
    UpToDate(Vec<PathBuf>),
    /// `--check`: these artifacts are missing or differ.
    Stale(Vec<PathBuf>),
}

/// Regenerate the artifacts for `config`, writing them unless `check`.
///
/// Every artifact is rendered before the first write, so a generation
/// failure leaves the output directory untouched.
pub fn run(config: &EvalrowConfig, check: bool) -> anyhow::Result<Report> {
    let options = config.generate_options();
    let generation = generate::<EvaluationRow>(&options).context("schema generation failed")?;
    let out_dir = config.out_dir();

    if check {
        let stale = stale_artifacts(&generation, &out_dir)?;
        if stale.is_empty() {
            return Ok(Report::UpToDate(artifact_paths(&generation, &out_dir)));
        }
        return Ok(Report::Stale(stale));
    }

    write_artifacts(&generation, &out_dir).map(Report::Written)
}

fn artifact_paths(generation: &Generation, out_dir: &Path) -> Vec<PathBuf> {
    generation
        .artifacts
        .iter()
        .map(|a| out_dir.join(&a.file_name))
        .collect()
}

/// Write every artifact under `out_dir`, creating it if needed.
pub fn write_artifacts(generation: &Generation, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(generation.artifacts.len());
    for artifact in &generation.artifacts {
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), backend = artifact.backend, "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// Artifacts whose file under `out_dir` is missing or differs.
pub fn stale_artifacts(generation: &Generation, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for artifact in &generation.artifacts {
        let path = out_dir.join(&artifact.file_name);
        match std::fs::read_to_string(&path) {
            Ok(current) if current == artifact.contents => {}
            Ok(_) => {
                tracing::debug!(path = %path.display(), "artifact differs");
                stale.push(path);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "artifact missing");
                stale.push(path);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        }
    }
    Ok(stale)
}
