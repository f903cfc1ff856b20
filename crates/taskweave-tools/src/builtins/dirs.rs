//! Namespace-only operations: `mkdir`, `cd`, `pwd`.
//!
//! These touch the directory tree and the per-run current-directory cursor;
//! they never touch file content or versions.

use crate::tool::{Tool, ToolDescriptor};
use async_trait::async_trait;
use taskweave_core::{ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;

/// Creates a directory (and missing parents) in the namespace tree.
pub struct MkdirTool {
    descriptor: ToolDescriptor,
}

impl MkdirTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "mkdir".to_string(),
                description: "Create a directory in the virtual filesystem, including \
                    missing parents."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Directory path to create"
                        }
                    },
                    "required": ["path"]
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for MkdirTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MkdirTool {
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
        let (path, created) = state.vfs.mkdir(path);
        let message = if created {
            format!("Created directory {path}")
        } else {
            format!("Directory {path} already exists")
        };
        Ok(ToolResult::success(&call.id, message))
    }
}

/// Changes the current directory cursor.
pub struct CdTool {
    descriptor: ToolDescriptor,
}

impl CdTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "cd".to_string(),
                description: "Change the current directory. Supports relative paths \
                    and '..'."
                    .to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Target directory"
                        }
                    },
                    "required": ["path"]
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for CdTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CdTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let path = call.arguments["path"].as_str().unwrap_or_default();
        match state.vfs.cd(path) {
            Ok(new_dir) => Ok(ToolResult::success(
                &call.id,
                format!("Changed directory to {new_dir}"),
            )),
            Err(_) => Ok(ToolResult::error(
                &call.id,
                format!("Directory {} does not exist", state.vfs.resolve(path)),
            )),
        }
    }
}

/// Reports the current directory cursor.
pub struct PwdTool {
    descriptor: ToolDescriptor,
}

impl PwdTool {
    /// Creates the tool.
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "pwd".to_string(),
                description: "Print the current directory.".to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
                checkpoint: None,
            },
        }
    }
}

impl Default for PwdTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PwdTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        Ok(ToolResult::success(&call.id, state.vfs.pwd()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mkdir_then_cd_then_pwd() {
        let mut state = StateContainer::new();

        let mkdir = MkdirTool::new();
        let result = mkdir
            .invoke(
                &ToolCall::new("d1", "mkdir", serde_json::json!({"path": "/work/src"})),
                &mut state,
            )
            .await
            .unwrap();
        assert!(result.content.contains("Created directory /work/src"));

        let cd = CdTool::new();
        let result = cd
            .invoke(
                &ToolCall::new("d2", "cd", serde_json::json!({"path": "/work/src"})),
                &mut state,
            )
            .await
            .unwrap();
        assert!(!result.is_error);

        let pwd = PwdTool::new();
        let result = pwd
            .invoke(
                &ToolCall::new("d3", "pwd", serde_json::json!({})),
                &mut state,
            )
            .await
            .unwrap();
        assert_eq!(result.content, "/work/src");
    }

    #[tokio::test]
    async fn test_mkdir_existing_reports_it() {
        let mut state = StateContainer::new();
        let mkdir = MkdirTool::new();
        let call = ToolCall::new("d4", "mkdir", serde_json::json!({"path": "/dup"}));
        mkdir.invoke(&call, &mut state).await.unwrap();
        let result = mkdir.invoke(&call, &mut state).await.unwrap();
        assert!(result.content.contains("already exists"));
    }

    #[tokio::test]
    async fn test_cd_missing_directory_is_error() {
        let mut state = StateContainer::new();
        let cd = CdTool::new();
        let result = cd
            .invoke(
                &ToolCall::new("d5", "cd", serde_json::json!({"path": "/ghost"})),
                &mut state,
            )
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.content.contains("does not exist"));
    }
}
