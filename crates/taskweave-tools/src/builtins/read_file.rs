use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{ToolCall, ToolResult, WeaveError, WeaveResult};
use taskweave_state::StateContainer;

/// Default number of lines returned per read.
const DEFAULT_LIMIT: usize = 2000;
/// Lines longer than this are truncated in the rendered output.
const MAX_LINE_CHARS: usize = 2000;

/// Reads a file with an optional line window, rendered with line numbers.
pub struct ReadFileTool {
    descriptor: ToolDescriptor,
}

impl ReadFileTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "read_file".to_string(),
                description: "Read a file from the virtual filesystem. Output is \
                    line-numbered; use offset and limit to window large files."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Path of the file to read"
                        },
                        "offset": {
                            "type": "integer",
                            "description": "Zero-based line to start from (default: 0)"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of lines to return (default: 2000)"
                        }
                    },
                    "required": ["path"]
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let path = call.arguments["path"].as_str().unwrap_or_default();
        let offset = call.arguments["offset"].as_u64().unwrap_or(0) as usize;
        let limit = call.arguments["limit"]
            .as_u64()
            .map_or(DEFAULT_LIMIT, |l| l as usize);

        let content = match state.vfs.read(path) {
            Ok(content) => content,
            Err(WeaveError::NotFound(path)) => {
                return Ok(ToolResult::error(
                    &call.id,
                    format!("File '{path}' not found"),
                ));
            }
            Err(e) => return Err(e),
        };

        if content.trim().is_empty() {
            return Ok(ToolResult::success(
                &call.id,
                "System reminder: File exists but has empty contents",
            ));
        }

        let lines: Vec<&str> = content.lines().collect();
        if offset >= lines.len() {
            return Ok(ToolResult::error(
                &call.id,
                format!(
                    "Line offset {offset} exceeds file length ({} lines)",
                    lines.len()
                ),
            ));
        }

        let end = (offset + limit).min(lines.len());
        let rendered: Vec<String> = lines[offset..end]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                // Truncate on a char boundary, not a byte offset.
                let line = match line.char_indices().nth(MAX_LINE_CHARS) {
                    Some((idx, _)) => &line[..idx],
                    None => line,
                };
                format!("{:6}\t{line}", offset + i + 1)
            })
            .collect();

        Ok(ToolResult::success(&call.id, rendered.join("\n")))
    }
}
