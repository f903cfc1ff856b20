use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;

/// Lists the files and subdirectories of a directory (non-recursive), or
/// every file path in the filesystem when `all` is set.
pub struct LsTool {
    descriptor: ToolDescriptor,
}

impl LsTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "ls".to_string(),
                description: "List files and directories. Defaults to the current \
                    directory; pass a path to list elsewhere, or all=true for every \
                    file in the filesystem."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Directory to list (default: current directory)"
                        },
                        "all": {
                            "type": "boolean",
                            "description": "List every file path recursively (default: false)"
                        }
                    }
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for LsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        if call.arguments["all"].as_bool().unwrap_or(false) {
            if state.vfs.file_count() == 0 {
                return Ok(ToolResult::success(&call.id, "No files"));
            }
            return Ok(ToolResult::success(&call.id, state.vfs.paths().join("\n")));
        }

        let path = call.arguments["path"].as_str();
        let dir = path.map_or_else(|| state.vfs.pwd().to_string(), |p| state.vfs.resolve(p));

        let mut lines: Vec<String> = state
            .vfs
            .subdirectories(Some(&dir))
            .into_iter()
            .map(|d| format!("d  {d}/"))
            .collect();
        for entry in state.vfs.list(Some(&dir)) {
            lines.push(format!(
                "-  {:>8}  {}  {}",
                entry.size,
                entry.modified_at.format("%Y-%m-%d %H:%M:%S"),
                entry.path
            ));
        }

        if lines.is_empty() {
            return Ok(ToolResult::success(
                &call.id,
                format!("Directory {dir} is empty"),
            ));
        }
        Ok(ToolResult::success(&call.id, lines.join("\n")))
    }
}
