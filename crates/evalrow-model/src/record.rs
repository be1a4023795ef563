//! Evaluation record types.
//!
//! These are the canonical definitions: the serde types used by producers
//! and consumers in Rust, each paired with the declaration the schema
//! generator reads.

use crate::decl::{Declare, Declared, FieldDecl, RecordDecl};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known message roles.
pub mod role {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const TOOL: &str = "tool";
}

/// Open string-keyed metadata bag.
pub type Metadata = BTreeMap<String, Value>;

/// A function invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// Tool call kind. Only function calls exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ToolCallKind {
    #[default]
    Function,
}

/// A tool call attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToolCallKind,
    pub function: FunctionCall,
}

/// Chat message compatible with OpenAI's interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Message {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

/// Result of a single metric evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct MetricResult {
    pub is_score_valid: bool,
    pub score: f64,
    pub reason: String,
}

/// Step identifier: numeric or symbolic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum StepIndex {
    Number(i64),
    Name(String),
}

/// Base reward and other metrics for a single conceptual step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct StepOutput {
    pub step_index: StepIndex,
    pub base_reward: f64,
    #[serde(default)]
    pub terminated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_info: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn default_true() -> bool {
    true
}

/// The complete result of an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EvaluateResult {
    pub score: f64,
    #[serde(default = "default_true")]
    pub is_score_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, MetricResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_outputs: Option<Vec<StepOutput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_info: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_control_plane_info: Option<Metadata>,
}

/// Unified data structure for a single evaluation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EvaluationRow {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Metadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<EvaluateResult>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            name: None,
            tool_call_id: None,
            tool_calls: None,
            function_call: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(role::USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(role::ASSISTANT, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(role::SYSTEM, content)
    }
}

impl EvaluateResult {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            is_score_valid: true,
            reason: None,
            metrics: None,
            step_outputs: None,
            error: None,
            trajectory_info: None,
            final_control_plane_info: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_step_outputs(mut self, steps: Vec<StepOutput>) -> Self {
        self.step_outputs = Some(steps);
        self
    }
}

impl StepOutput {
    pub fn new(step_index: StepIndex, base_reward: f64) -> Self {
        Self {
            step_index,
            base_reward,
            terminated: false,
            control_plane_info: None,
            metrics: None,
            reason: None,
        }
    }
}

impl EvaluationRow {
    /// Assemble a row from its messages; every other field starts absent.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            input_metadata: None,
            ground_truth: None,
            evaluation_result: None,
        }
    }

    pub fn with_input_metadata(mut self, metadata: Metadata) -> Self {
        self.input_metadata = Some(metadata);
        self
    }

    pub fn with_ground_truth(mut self, ground_truth: impl Into<String>) -> Self {
        self.ground_truth = Some(ground_truth.into());
        self
    }

    pub fn with_evaluation_result(mut self, result: EvaluateResult) -> Self {
        self.evaluation_result = Some(result);
        self
    }

    /// Whether this row carries a multi-step (trajectory) evaluation.
    pub fn is_trajectory_evaluation(&self) -> bool {
        self.evaluation_result
            .as_ref()
            .and_then(|r| r.step_outputs.as_ref())
            .is_some_and(|steps| !steps.is_empty())
    }

    /// Messages sent with the given role, in order.
    pub fn messages_by_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages.iter().filter(move |m| m.role == role)
    }

    pub fn assistant_messages(&self) -> Vec<&Message> {
        self.messages_by_role(role::ASSISTANT).collect()
    }

    pub fn user_messages(&self) -> Vec<&Message> {
        self.messages_by_role(role::USER).collect()
    }

    /// Look up an input metadata value. A stored `null` counts as absent.
    pub fn input_metadata(&self, key: &str) -> Option<&Value> {
        self.input_metadata
            .as_ref()?
            .get(key)
            .filter(|value| !value.is_null())
    }

    /// Look up an input metadata value, falling back to `default` when the
    /// key is missing or `null`.
    pub fn input_metadata_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.input_metadata(key).unwrap_or(default)
    }
}

#[cfg(feature = "schema")]
fn schema_value<T: schemars::JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

#[cfg(feature = "schema")]
fn structural<T: schemars::JsonSchema>() -> Option<fn() -> Value> {
    Some(schema_value::<T>)
}

#[cfg(not(feature = "schema"))]
fn structural<T>() -> Option<fn() -> Value> {
    None
}

impl Declare for FunctionCall {
    fn declaration() -> RecordDecl {
        RecordDecl::new("FunctionCall")
            .with_docs("A function invocation requested by the assistant")
            .field(FieldDecl::required("name", Declared::String))
            .field(
                FieldDecl::required("arguments", Declared::String)
                    .with_docs("JSON-encoded arguments"),
            )
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for ToolCall {
    fn declaration() -> RecordDecl {
        RecordDecl::new("ToolCall")
            .with_docs("A tool call attached to an assistant message")
            .field(FieldDecl::required("id", Declared::String))
            .field(FieldDecl::required("type", Declared::Literal("function")))
            .field(FieldDecl::required(
                "function",
                Declared::record::<FunctionCall>(),
            ))
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for Message {
    fn declaration() -> RecordDecl {
        RecordDecl::new("Message")
            .with_docs("Chat message model compatible with OpenAI's interface")
            .field(
                FieldDecl::required("role", Declared::String)
                    .with_docs("Sender role (system, user, assistant, tool)"),
            )
            .field(FieldDecl::optional("content", Declared::String))
            .field(FieldDecl::optional("name", Declared::String))
            .field(FieldDecl::optional("tool_call_id", Declared::String))
            .field(FieldDecl::optional(
                "tool_calls",
                Declared::list(Declared::record::<ToolCall>()),
            ))
            .field(FieldDecl::optional(
                "function_call",
                Declared::record::<FunctionCall>(),
            ))
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for MetricResult {
    fn declaration() -> RecordDecl {
        RecordDecl::new("MetricResult")
            .with_docs("Result of a single metric evaluation")
            .field(FieldDecl::required("is_score_valid", Declared::Boolean))
            .field(FieldDecl::required("score", Declared::Number))
            .field(FieldDecl::required("reason", Declared::String))
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for StepOutput {
    fn declaration() -> RecordDecl {
        RecordDecl::new("StepOutput")
            .with_docs("Defines the base reward and other metrics for a single conceptual step")
            .field(FieldDecl::required(
                "step_index",
                Declared::union(vec![Declared::Integer, Declared::String]),
            ))
            .field(FieldDecl::required("base_reward", Declared::Number))
            .field(FieldDecl::defaulted(
                "terminated",
                Declared::Boolean,
                Value::Bool(false),
            ))
            .field(FieldDecl::optional("control_plane_info", Declared::open_map()))
            .field(FieldDecl::optional("metrics", Declared::open_map()))
            .field(FieldDecl::optional("reason", Declared::String))
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for EvaluateResult {
    fn declaration() -> RecordDecl {
        RecordDecl::new("EvaluateResult")
            .with_docs("The complete result of an evaluator")
            .field(FieldDecl::required("score", Declared::Number))
            .field(FieldDecl::defaulted(
                "is_score_valid",
                Declared::Boolean,
                Value::Bool(true),
            ))
            .field(FieldDecl::optional("reason", Declared::String))
            .field(FieldDecl::optional(
                "metrics",
                Declared::map_of(Declared::record::<MetricResult>()),
            ))
            .field(
                FieldDecl::optional("step_outputs", Declared::list(Declared::record::<StepOutput>()))
                    .with_docs("Per-step outputs; non-empty for trajectory evaluations"),
            )
            .field(FieldDecl::optional("error", Declared::String))
            .field(FieldDecl::optional("trajectory_info", Declared::open_map()))
            .field(FieldDecl::optional(
                "final_control_plane_info",
                Declared::open_map(),
            ))
            .with_structural_schema(structural::<Self>())
    }
}

impl Declare for EvaluationRow {
    fn declaration() -> RecordDecl {
        RecordDecl::new("EvaluationRow")
            .with_docs("Unified data structure for a single evaluation unit")
            .field(FieldDecl::required(
                "messages",
                Declared::list(Declared::record::<Message>()),
            ))
            .field(FieldDecl::optional(
                "tools",
                Declared::list(Declared::open_map()),
            ))
            .field(
                FieldDecl::optional("input_metadata", Declared::open_map())
                    .with_docs("Free-form metadata describing the input"),
            )
            .field(FieldDecl::optional("ground_truth", Declared::String))
            .field(FieldDecl::optional(
                "evaluation_result",
                Declared::record::<EvaluateResult>(),
            ))
            .with_structural_schema(structural::<Self>())
    }
}
