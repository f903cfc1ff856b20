use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{CheckpointKind, ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;
use tracing::info;

/// Copies a file's current content to a new path. The copy starts its own
/// version lineage; later writes to the source do not affect it.
pub struct CopyFileTool {
    descriptor: ToolDescriptor,
}

impl CopyFileTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "cp".to_string(),
                description: "Copy a file. The destination gets the source's current \
                    content with a fresh version history."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "source": {
                            "type": "string",
                            "description": "Path of the file to copy"
                        },
                        "destination": {
                            "type": "string",
                            "description": "Path of the copy"
                        }
                    },
                    "required": ["source", "destination"]
                }),
                checkpoint: Some(CheckpointKind::FileCopy),
            },
        }
    }
}

impl Default for CopyFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CopyFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let source = call.arguments["source"].as_str().unwrap_or_default();
        let destination = call.arguments["destination"].as_str().unwrap_or_default();
        if source.is_empty() || destination.is_empty() {
            return Ok(ToolResult::error(
                &call.id,
                "Both source and destination are required",
            ));
        }

        match state.vfs.copy(source, destination) {
            Ok(record) => {
                info!(source = %source, destination = %record.path, "File copied");
                Ok(ToolResult::success(
                    &call.id,
                    format!("Copied {source} to {}", record.path),
                ))
            }
            Err(_) => Ok(ToolResult::error(
                &call.id,
                format!("Source file {source} not found"),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_is_independent_of_source() {
        let tool = CopyFileTool::new();
        let mut state = StateContainer::new();
        state.vfs.write("/a.txt", "original");

        let call = ToolCall::new(
            "c1",
            "cp",
            serde_json::json!({"source": "/a.txt", "destination": "/b.txt"}),
        );
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(!result.is_error);

        state.vfs.write("/a.txt", "v3");
        assert_eq!(state.vfs.read("/b.txt").unwrap(), "original");
        assert_eq!(state.vfs.record("/b.txt").unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let tool = CopyFileTool::new();
        let mut state = StateContainer::new();
        let call = ToolCall::new(
            "c2",
            "cp",
            serde_json::json!({"source": "/nope.txt", "destination": "/b.txt"}),
        );
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.is_error);
        assert!(result.content.contains("not found"));
    }
}
