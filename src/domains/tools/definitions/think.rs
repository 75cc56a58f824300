//! Cognitive scratchpad capability.
//!
//! These operations have no side effects beyond logging. They give an agent
//! a structured place to record knowledge, reasoning and exploratory
//! thoughts as tool calls.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

const REASONING_TYPES: &[&str] = &["analysis", "hypothesis", "planning", "verification", "correction"];

#[derive(Debug, Clone, Deserialize)]
pub struct RecallParams {
    pub knowledge_content: String,
    #[serde(default)]
    pub topic_tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReasonParams {
    pub thought_process: String,
    #[serde(default)]
    pub reasoning_type: Option<String>,
    #[serde(default)]
    pub focus_area: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThinkParams {
    pub thought: String,
    pub thinking_type: String,
    #[serde(default)]
    pub focus_area: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CognitiveOutput {
    pub status: &'static str,
    pub message: String,
}

impl CognitiveOutput {
    fn processed(message: impl Into<String>) -> Self {
        Self {
            status: "processed",
            message: message.into(),
        }
    }

    fn spec() -> TypeSpec {
        TypeSpec::object([
            ParamSpec::new("status", TypeSpec::String),
            ParamSpec::new("message", TypeSpec::String),
        ])
    }
}

pub struct ThinkTool;

impl ThinkTool {
    async fn recall(_ctx: ToolContext, params: RecallParams) -> Result<CognitiveOutput, ToolError> {
        info!(
            topic = params.topic_tag.as_deref().unwrap_or("-"),
            chars = params.knowledge_content.len(),
            "Knowledge recalled"
        );
        Ok(CognitiveOutput::processed("Knowledge recalled"))
    }

    async fn reason(_ctx: ToolContext, params: ReasonParams) -> Result<CognitiveOutput, ToolError> {
        info!(
            reasoning_type = params.reasoning_type.as_deref().unwrap_or("analysis"),
            focus = params.focus_area.as_deref().unwrap_or("-"),
            chars = params.thought_process.len(),
            "Reasoning recorded"
        );
        Ok(CognitiveOutput::processed("Reasoning completed"))
    }

    async fn think(_ctx: ToolContext, params: ThinkParams) -> Result<CognitiveOutput, ToolError> {
        info!(
            thinking_type = %params.thinking_type,
            focus = params.focus_area.as_deref().unwrap_or("-"),
            chars = params.thought.len(),
            "Exploratory thought recorded"
        );
        Ok(CognitiveOutput::processed(format!(
            "Exploratory thinking '{}' recorded",
            params.thinking_type
        )))
    }
}

impl Capability for ThinkTool {
    const NAMESPACE: Option<&'static str> = Some("think");
    const DESCRIPTION: &'static str = "Structured scratchpad for recall, reasoning and exploration";

    fn operations() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new(
                "recall",
                "Record factual knowledge relevant to the task (what you know).",
                Self::recall,
            )
            .param(ParamSpec::new("knowledge_content", TypeSpec::String))
            .param(ParamSpec::new("topic_tag", TypeSpec::optional(TypeSpec::String)))
            .returns(CognitiveOutput::spec()),
            OperationDescriptor::new(
                "reason",
                "Record goal-directed reasoning (how you solve the problem).",
                Self::reason,
            )
            .param(ParamSpec::new("thought_process", TypeSpec::String))
            .param(ParamSpec::new(
                "reasoning_type",
                TypeSpec::optional(TypeSpec::one_of(REASONING_TYPES)),
            ))
            .param(ParamSpec::new("focus_area", TypeSpec::optional(TypeSpec::String)))
            .returns(CognitiveOutput::spec()),
            OperationDescriptor::new(
                "think",
                "Record open-ended exploratory thinking without a predetermined path.",
                Self::think,
            )
            .param(ParamSpec::new("thought", TypeSpec::String))
            .param(
                ParamSpec::new("thinking_type", TypeSpec::String)
                    .describe("e.g. brainstorming, mental_simulation, perspective_taking"),
            )
            .param(ParamSpec::new("focus_area", TypeSpec::optional(TypeSpec::String)))
            .returns(CognitiveOutput::spec()),
        ]
    }
}
