use crate::todos::TodoList;
use crate::vfs::Vfs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use taskweave_core::Message;

/// The single unit of truth threaded through every orchestration step.
///
/// Readers always see either the pre- or post-update snapshot of a field,
/// never a torn mix: the step loop serializes writers, and subagents work on
/// forks created by [`StateContainer::child`] that are merged back at a
/// single well-defined point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateContainer {
    /// Ordered plan items for the current task.
    pub todos: TodoList,
    /// The versioned virtual filesystem.
    pub vfs: Vfs,
    /// Conversation transcript, oldest first.
    pub messages: Vec<Message>,
    /// Operation name to recorded durations, scoped to this run.
    /// Explicit state, never a process-wide singleton.
    #[serde(default)]
    pub benchmarks: BTreeMap<String, Vec<Duration>>,
    /// Current delegation depth (0 = root run).
    #[serde(default)]
    pub depth: u32,
    /// Steps taken in the current run.
    #[serde(default)]
    pub step_count: u32,
}

impl StateContainer {
    /// Creates an empty container for a new root run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fork an isolated child context for a subagent dispatch.
    ///
    /// The child starts from a copy of the parent's filesystem but with an
    /// empty todo list, transcript, and benchmark map: a subagent's planning
    /// state never leaks into (or out of) the parent. Depth increases by
    /// one; the step budget restarts.
    pub fn child(&self) -> Self {
        Self {
            todos: TodoList::new(),
            vfs: self.vfs.clone(),
            messages: Vec::new(),
            benchmarks: BTreeMap::new(),
            depth: self.depth + 1,
            step_count: 0,
        }
    }

    /// Append a conversation turn.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record a duration sample for a named operation.
    pub fn record_benchmark(&mut self, operation: impl Into<String>, duration: Duration) {
        self.benchmarks
            .entry(operation.into())
            .or_default()
            .push(duration);
    }

    /// Reset planning state for a new top-level task. Files and transcript
    /// survive; the todo list is destroyed.
    pub fn begin_task(&mut self) {
        self.todos.clear();
        self.step_count = 0;
    }

    /// Serialize a lossless snapshot of this container.
    pub fn snapshot(&self) -> taskweave_core::WeaveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a container from a snapshot produced by
    /// [`StateContainer::snapshot`].
    pub fn restore(snapshot: &str) -> taskweave_core::WeaveResult<Self> {
        Ok(serde_json::from_str(snapshot)?)
    }
}
