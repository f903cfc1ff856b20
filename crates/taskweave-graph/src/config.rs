use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base prompt appended to host instructions, describing the built-in
/// planning and delegation tools.
pub const DEFAULT_BASE_PROMPT: &str = "You have access to a number of standard tools.\n\n\
## `write_todos`\n\n\
Use `write_todos` frequently to plan tasks and give the user visibility into \
your progress. Break larger tasks into smaller steps, and mark each item \
completed as soon as it is done — do not batch completions.\n\n\
## `task`\n\n\
Use the `task` tool to delegate self-contained work to a subagent and keep \
your own context small.";

/// Independently configurable ceilings for a run.
///
/// Nesting depth and total work are orthogonal runaway modes, so both limits
/// exist separately: `max_depth` bounds delegation nesting, `max_steps`
/// bounds tool-call iterations within one loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunLimits {
    /// Maximum delegation nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Maximum orchestration steps per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_steps() -> u32 {
    50
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_steps: default_max_steps(),
        }
    }
}

/// Configuration for an [`crate::AgentGraph`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphConfig {
    /// Depth and step ceilings.
    #[serde(default)]
    pub limits: RunLimits,
    /// Host-supplied instructions, placed at the top of the system prompt.
    #[serde(default)]
    pub instructions: String,
    /// Complete system-prompt override. When set, `instructions` and the
    /// base prompt are ignored.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Whether to append [`DEFAULT_BASE_PROMPT`] to the instructions.
    #[serde(default = "default_true")]
    pub use_default_prompt: bool,
    /// Deadline for a single model call. A lapse is a step failure.
    #[serde(default)]
    pub step_timeout: Option<Duration>,
    /// Deadline for a whole subagent dispatch. A lapse fails the dispatch.
    #[serde(default)]
    pub dispatch_timeout: Option<Duration>,
}

fn default_true() -> bool {
    true
}

impl GraphConfig {
    /// Creates a config with the given instructions and defaults elsewhere.
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            use_default_prompt: true,
            ..Self::default()
        }
    }

    /// Sets the run limits.
    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The composed system prompt for the root agent.
    pub fn compose_system_prompt(&self) -> String {
        if let Some(prompt) = &self.system_prompt {
            return prompt.clone();
        }
        if self.use_default_prompt {
            if self.instructions.is_empty() {
                DEFAULT_BASE_PROMPT.to_string()
            } else {
                format!("{}\n\n{DEFAULT_BASE_PROMPT}", self.instructions)
            }
        } else {
            self.instructions.clone()
        }
    }
}
