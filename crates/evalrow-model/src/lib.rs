//! Canonical evaluation record model.
//!
//! `evalrow-model` is the single source of truth for the evaluation data
//! model: serde types for Rust consumers, an explicit structural
//! declaration per record ([`Declare`]) for the schema generator, and Rust
//! counterparts of the generated TypeScript helpers.
//!
//! # Records
//!
//! ```text
//! EvaluationRow
//! ├── messages: Message[]
//! │   ├── tool_calls: ToolCall[] ── function: FunctionCall
//! │   └── function_call: FunctionCall
//! └── evaluation_result: EvaluateResult
//!     ├── metrics: { [name]: MetricResult }
//!     └── step_outputs: StepOutput[]
//! ```
//!
//! # Feature Flags
//!
//! - `schema` (default) - derive `schemars::JsonSchema` on every record and
//!   expose it through [`RecordDecl::structural_schema`]

pub mod check;
pub mod decl;
pub mod record;

pub use check::{Validation, is_evaluation_row, validate_evaluation_row};
pub use decl::{Declare, Declared, FieldDecl, RecordDecl};
pub use record::{
    EvaluateResult, EvaluationRow, FunctionCall, Message, Metadata, MetricResult, StepIndex,
    StepOutput, ToolCall, ToolCallKind, role,
};
