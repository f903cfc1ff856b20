use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{CheckpointKind, ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;
use tracing::info;

/// Targeted string replacement within a file.
///
/// Expressed as read-modify-write: the current content is fetched, the
/// replacement applied, and the result pushed back through `write`, so
/// versioning stays centralized in the filesystem.
pub struct EditFileTool {
    descriptor: ToolDescriptor,
}

impl EditFileTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "edit_file".to_string(),
                description: "Replace a string in a file. The old string must exist \
                    and be unique unless replace_all is set."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Path of the file to edit"
                        },
                        "old_string": {
                            "type": "string",
                            "description": "Exact text to replace"
                        },
                        "new_string": {
                            "type": "string",
                            "description": "Replacement text"
                        },
                        "replace_all": {
                            "type": "boolean",
                            "description": "Replace every occurrence (default: false)"
                        }
                    },
                    "required": ["path", "old_string", "new_string"]
                }),
                checkpoint: Some(CheckpointKind::FileEdit),
            },
        }
    }
}

impl Default for EditFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let path = call.arguments["path"].as_str().unwrap_or_default();
        let old_string = call.arguments["old_string"].as_str().unwrap_or_default();
        let new_string = call.arguments["new_string"].as_str().unwrap_or_default();
        let replace_all = call.arguments["replace_all"].as_bool().unwrap_or(false);

        if old_string.is_empty() {
            return Ok(ToolResult::error(&call.id, "old_string must not be empty"));
        }

        let content = match state.vfs.read(path) {
            Ok(content) => content.to_string(),
            Err(_) => {
                return Ok(ToolResult::error(
                    &call.id,
                    format!("File '{path}' not found"),
                ));
            }
        };

        let occurrences = content.matches(old_string).count();
        if occurrences == 0 {
            return Ok(ToolResult::error(
                &call.id,
                format!("String not found in file: '{old_string}'"),
            ));
        }
        if occurrences > 1 && !replace_all {
            return Ok(ToolResult::error(
                &call.id,
                format!(
                    "String '{old_string}' appears {occurrences} times in file. Use \
                     replace_all to replace all instances, or provide a more specific \
                     string with surrounding context."
                ),
            ));
        }

        let new_content = if replace_all {
            content.replace(old_string, new_string)
        } else {
            content.replacen(old_string, new_string, 1)
        };
        let record = state.vfs.write(path, new_content);
        info!(path = %record.path, version = record.version, occurrences, "File edited");

        let replaced = if replace_all { occurrences } else { 1 };
        Ok(ToolResult::success(
            &call.id,
            format!(
                "Replaced {replaced} instance(s) in '{}' (now version {})",
                record.path, record.version
            ),
        ))
    }
}
