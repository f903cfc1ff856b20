use crate::tool::{Tool, ToolDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use taskweave_core::{ToolCall, ToolResult, WeaveError, WeaveResult};
use taskweave_state::StateContainer;
use tracing::info;

/// Central registry for all available tools. Cloning shares the registered
/// tool instances.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with every built-in tool.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register a tool under its descriptor name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.clone();
        info!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Descriptors of every registered tool.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// A registry holding only the named tools (shared instances).
    /// Names with no registered tool are skipped.
    pub fn subset(&self, names: &[String]) -> Self {
        let tools = names
            .iter()
            .filter_map(|n| self.tools.get(n).map(|t| (n.clone(), t.clone())))
            .collect();
        Self { tools }
    }

    /// Execute a tool call against the run state.
    ///
    /// An unregistered name is a [`WeaveError::Tool`], which the
    /// orchestration loop reports back to the model as an error tool-result.
    pub async fn execute(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
    ) -> WeaveResult<ToolResult> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| WeaveError::Tool(format!("unknown tool: {}", call.name)))?;
        tool.invoke(call, state).await
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
