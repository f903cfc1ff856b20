use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use taskweave_core::{CheckpointKind, WeaveError, WeaveResult};
use taskweave_state::FileRecord;
use taskweave_tools::ToolDescriptor;

/// Static configuration of one subagent role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubagentDefinition {
    /// Role name the model uses to select this subagent.
    pub name: String,
    /// What this subagent is for, surfaced in the task tool description so
    /// the parent model can decide when to delegate.
    pub description: String,
    /// System prompt for the subagent's own loop.
    pub instructions: String,
    /// Tool names this subagent may use. `None` grants the full registry.
    #[serde(default)]
    pub allowed_tools: Option<Vec<String>>,
}

/// Role-to-definition lookup supplied at graph construction.
#[derive(Debug, Clone, Default)]
pub struct SubagentRegistry {
    defs: HashMap<String, SubagentDefinition>,
}

impl SubagentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subagent definition under its role name.
    pub fn register(&mut self, def: SubagentDefinition) {
        self.defs.insert(def.name.clone(), def);
    }

    /// Look up a role, failing with `UnknownRole` if absent.
    pub fn get(&self, role: &str) -> WeaveResult<&SubagentDefinition> {
        self.defs
            .get(role)
            .ok_or_else(|| WeaveError::UnknownRole(role.to_string()))
    }

    /// Registered role names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether any roles are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Descriptor for the `task` delegation tool, listing the available
    /// roles so the parent model can pick one.
    pub fn task_descriptor(&self) -> ToolDescriptor {
        let mut roles: Vec<&SubagentDefinition> = self.defs.values().collect();
        roles.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        let role_lines: Vec<String> = roles
            .iter()
            .map(|d| format!("- {}: {}", d.name, d.description))
            .collect();

        ToolDescriptor {
            name: crate::runner::TASK_TOOL.to_string(),
            description: format!(
                "Delegate a self-contained task to a subagent. The subagent works on \
                 an isolated copy of the filesystem; only its final answer and file \
                 changes come back. Available subagent types:\n{}",
                role_lines.join("\n")
            ),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Full task description for the subagent"
                    },
                    "subagent_type": {
                        "type": "string",
                        "description": "Role name of the subagent to run"
                    }
                },
                "required": ["description", "subagent_type"]
            }),
            checkpoint: Some(CheckpointKind::SubagentDispatch),
        }
    }
}

/// Status of a completed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubagentStatus {
    /// The child loop produced a final answer.
    Success,
    /// The child loop failed (guard trip, model error, unhandled tool
    /// error, or timeout).
    Failure,
    /// The child was cancelled at a step boundary.
    Cancelled,
}

/// Outcome of one subagent dispatch. Transient: merged into the parent
/// container and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubagentResult {
    /// The role that ran.
    pub role: String,
    /// Final answer on success; the error description otherwise.
    pub output: String,
    /// Files the child created or changed relative to its starting copy.
    /// Merged into the parent on success; attached unmerged on failure or
    /// cancellation so the parent can decide.
    pub file_deltas: BTreeMap<String, FileRecord>,
    /// How the dispatch ended.
    pub status: SubagentStatus,
}
