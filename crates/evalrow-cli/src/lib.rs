//! Library half of the `evalrow-schema` binary.
//!
//! Loads configuration, runs the generator for
//! [`EvaluationRow`](evalrow_model::EvaluationRow) and writes (or checks)
//! the artifacts.

pub mod config;
pub mod logging;
pub mod run;

pub use config::EvalrowConfig;
pub use run::{Report, run, stale_artifacts, write_artifacts};
