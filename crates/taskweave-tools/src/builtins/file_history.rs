use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;

/// Prior versions shown in the rendered history.
const SHOWN_VERSIONS: usize = 5;

/// Renders a file's version history.
pub struct FileHistoryTool {
    descriptor: ToolDescriptor,
}

impl FileHistoryTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "file_history".to_string(),
                description: "Show the version history of a file: current version, \
                    modification time, size, and recent prior versions."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Path of the file"
                        }
                    },
                    "required": ["path"]
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for FileHistoryTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileHistoryTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let path = call.arguments["path"].as_str().unwrap_or_default();
        let record = match state.vfs.record(path) {
            Ok(record) => record,
            Err(_) => {
                return Ok(ToolResult::error(
                    &call.id,
                    format!("File '{path}' not found"),
                ));
            }
        };

        let mut lines = vec![
            format!("Current version: {}", record.version),
            format!("Modified: {}", record.modified_at.to_rfc3339()),
            format!("Size: {} bytes", record.size()),
        ];
        if !record.history.is_empty() {
            lines.push(String::new());
            lines.push("Version history:".to_string());
            for version in record.history.iter().rev().take(SHOWN_VERSIONS) {
                lines.push(format!(
                    "  v{}: {} ({} bytes)",
                    version.version,
                    version.modified_at.to_rfc3339(),
                    version.content.len()
                ));
            }
        }

        Ok(ToolResult::success(&call.id, lines.join("\n")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_renders_versions() {
        let tool = FileHistoryTool::new();
        let mut state = StateContainer::new();
        state.vfs.write("/a.txt", "v1");
        state.vfs.write("/a.txt", "v2");
        state.vfs.write("/a.txt", "v3");

        let call = ToolCall::new("h1", "file_history", serde_json::json!({"path": "/a.txt"}));
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.content.contains("Current version: 3"));
        assert!(result.content.contains("v2:"));
        assert!(result.content.contains("v1:"));
    }

    #[tokio::test]
    async fn test_history_missing_file() {
        let tool = FileHistoryTool::new();
        let mut state = StateContainer::new();
        let call = ToolCall::new("h2", "file_history", serde_json::json!({"path": "/nope"}));
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_history_single_version_has_no_history_section() {
        let tool = FileHistoryTool::new();
        let mut state = StateContainer::new();
        state.vfs.write("/a.txt", "only");
        let call = ToolCall::new("h3", "file_history", serde_json::json!({"path": "/a.txt"}));
        let result = tool.invoke(&call, &mut state).await.unwrap();
        assert!(result.content.contains("Current version: 1"));
        assert!(!result.content.contains("Version history"));
    }
}
