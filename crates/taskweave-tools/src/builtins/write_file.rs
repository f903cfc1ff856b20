use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{CheckpointKind, ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;
use tracing::info;

/// Writes content to a file in the virtual filesystem, creating it at
/// version 1 or stacking a new version on top of the old one.
pub struct WriteFileTool {
    descriptor: ToolDescriptor,
}

impl WriteFileTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "write_file".to_string(),
                description: "Write content to a file in the virtual filesystem. \
                    Creates the file if absent, otherwise records a new version."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Path of the file to write (absolute or relative)"
                        },
                        "content": {
                            "type": "string",
                            "description": "Full content to write"
                        }
                    },
                    "required": ["path", "content"]
                }),
                checkpoint: Some(CheckpointKind::FileWrite),
            },
        }
    }
}

impl Default for WriteFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let path = call.arguments["path"].as_str().unwrap_or_default();
        if path.is_empty() {
            return Ok(ToolResult::error(&call.id, "Empty path"));
        }
        let content = call.arguments["content"].as_str().unwrap_or_default();

        let record = state.vfs.write(path, content);
        info!(path = %record.path, version = record.version, size = record.size(), "File written");

        let response = serde_json::json!({
            "path": record.path,
            "version": record.version,
            "size": record.size(),
        });
        Ok(ToolResult::success(&call.id, response.to_string()))
    }
}
