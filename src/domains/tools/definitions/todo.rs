//! Todo list capability: renders todo entries as a Markdown table.

use serde::{Deserialize, Serialize};

use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

const STATUSES: &[&str] = &["planned", "pending", "done", "cancelled"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Planned,
    Pending,
    Done,
    Cancelled,
}

impl TodoStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Todo {
    /// Short identifier such as `create-config-file`.
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteParams {
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutput {
    pub markdown_table: String,
}

pub struct TodoListTool;

impl TodoListTool {
    async fn write(_ctx: ToolContext, params: WriteParams) -> Result<WriteOutput, ToolError> {
        Ok(WriteOutput {
            markdown_table: render_table(&params.todos),
        })
    }
}

impl Capability for TodoListTool {
    const NAMESPACE: Option<&'static str> = Some("todo");
    const DESCRIPTION: &'static str = "Todo list rendering";

    fn operations() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new(
                "write",
                "Render todo entries (id, content, status) as a Markdown table.",
                Self::write,
            )
            .param(ParamSpec::new(
                "todos",
                TypeSpec::list(TypeSpec::object([
                    ParamSpec::new("id", TypeSpec::String),
                    ParamSpec::new("content", TypeSpec::String),
                    ParamSpec::new("status", TypeSpec::one_of(STATUSES)),
                ])),
            ))
            .returns(TypeSpec::object([ParamSpec::new(
                "markdown_table",
                TypeSpec::String,
            )])),
        ]
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Render todos as a `| id | task | status |` table.
pub fn render_table(todos: &[Todo]) -> String {
    let mut lines = vec![
        "| id | task | status |".to_string(),
        "| --- | --- | --- |".to_string(),
    ];
    lines.extend(todos.iter().map(|t| {
        format!(
            "| {} | {} | {} |",
            escape_cell(&t.id),
            escape_cell(&t.content),
            t.status.as_str()
        )
    }));
    lines.join("\n")
}
