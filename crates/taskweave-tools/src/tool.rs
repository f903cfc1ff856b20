use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskweave_core::{CheckpointKind, ToolCall, ToolResult, WeaveResult};
use taskweave_state::StateContainer;

/// Metadata describing a tool's interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Name the model uses to invoke the tool.
    pub name: String,
    /// What the tool does, surfaced to the model.
    pub description: String,
    /// JSON schema of the tool's arguments.
    pub parameters_schema: serde_json::Value,
    /// When set, the orchestration loop consults the human gate with this
    /// checkpoint kind before every invocation.
    pub checkpoint: Option<CheckpointKind>,
}

/// Trait all tools implement, built-in or host-supplied.
///
/// `invoke` takes the run's state container by mutable reference: tools are
/// closed variants registered by name, dispatched through the
/// [`crate::ToolRegistry`], never probed dynamically.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's interface metadata.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Execute the call against the run state.
    async fn invoke(&self, call: &ToolCall, state: &mut StateContainer)
        -> WeaveResult<ToolResult>;
}
