use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use taskweave_core::{ToolCall, ToolResult, WeaveError, WeaveResult};
use taskweave_state::{StateContainer, TodoItem, TodoStatus};
use tracing::info;

/// Wire shape of one plan item as the model supplies it.
#[derive(Debug, Deserialize)]
struct TodoArg {
    description: String,
    #[serde(default)]
    status: Option<TodoStatus>,
}

/// Atomically replaces the entire todo list.
///
/// No partial-update API exists on purpose: the model must restate the full
/// plan on every update, which keeps it consistent.
pub struct WriteTodosTool {
    descriptor: ToolDescriptor,
}

impl WriteTodosTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "write_todos".to_string(),
                description: "Replace the entire task list with a new plan. Use this \
                    frequently to track progress and break complex tasks into steps; \
                    mark items completed as soon as they are done."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "todos": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "description": {
                                        "type": "string",
                                        "description": "What this step does"
                                    },
                                    "status": {
                                        "type": "string",
                                        "enum": ["pending", "in_progress", "completed", "blocked"],
                                        "description": "Current status (default: pending)"
                                    }
                                },
                                "required": ["description"]
                            },
                            "description": "The full replacement plan, in order"
                        }
                    },
                    "required": ["todos"]
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for WriteTodosTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WriteTodosTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let args: Vec<TodoArg> = match serde_json::from_value(call.arguments["todos"].clone()) {
            Ok(args) => args,
            Err(e) => {
                return Ok(ToolResult::error(
                    &call.id,
                    format!("Invalid todos payload: {e}"),
                ));
            }
        };

        let items: Vec<TodoItem> = args
            .into_iter()
            .map(|a| {
                let item = TodoItem::new(a.description);
                match a.status {
                    Some(status) => item.with_status(status),
                    None => item,
                }
            })
            .collect();
        let count = items.len();

        match state.todos.replace(items) {
            Ok(()) => {
                info!(items = count, "Todo list replaced");
                Ok(ToolResult::success(
                    &call.id,
                    format!("Updated todo list to {count} items"),
                ))
            }
            // Validation failure leaves the prior list intact.
            Err(WeaveError::InvalidTodos(msg)) => Ok(ToolResult::error(&call.id, msg)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_todos_replaces_list() {
        let tool = WriteTodosTool::new();
        let mut state = StateContainer::new();
        let call = ToolCall::new(
            "t1",
            "write_todos",
            serde_json::json!({
                "todos": [
                    {"description": "read the file", "status": "completed"},
                    {"description": "write the summary"}
                ]
            }),
        );
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(!result.is_error, "{}", result.content);
        assert_eq!(state.todos.len(), 2);
        assert_eq!(state.todos.current()[0].status, TodoStatus::Completed);
        assert_eq!(state.todos.current()[1].status, TodoStatus::Pending);
    }

    #[tokio::test]
    async fn test_empty_description_rejected_keeps_prior_plan() {
        let tool = WriteTodosTool::new();
        let mut state = StateContainer::new();
        state.todos.replace(vec![TodoItem::new("original")]).unwrap();

        let call = ToolCall::new(
            "t2",
            "write_todos",
            serde_json::json!({"todos": [{"description": ""}]}),
        );
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.is_error);
        assert_eq!(state.todos.len(), 1);
        assert_eq!(state.todos.current()[0].description, "original");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_error_result() {
        let tool = WriteTodosTool::new();
        let mut state = StateContainer::new();
        let call = ToolCall::new("t3", "write_todos", serde_json::json!({"todos": "nope"}));
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.is_error);
    }
}
