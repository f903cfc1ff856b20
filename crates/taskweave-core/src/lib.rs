//! Core types and error definitions for the Taskweave orchestration layer.
//!
//! This crate provides the foundational types shared across all Taskweave
//! crates: the error taxonomy, conversation message representations, tool
//! call abstractions, and the human-in-the-loop gate contract.
//!
//! # Main types
//!
//! - [`WeaveError`] — Unified error enum for all Taskweave subsystems.
//! - [`WeaveResult`] — Convenience alias for `Result<T, WeaveError>`.
//! - [`Role`] — Message role (user, assistant, system, tool).
//! - [`Message`] — A single conversation turn.
//! - [`ToolCall`] — A model-initiated tool invocation request.
//! - [`ToolResult`] — The result returned after executing a tool call.
//! - [`HumanGate`] — Checkpoint contract for human supervision.

/// Human-in-the-loop checkpoint types.
pub mod gate;
/// Conversation message types.
pub mod message;
/// Tool call wire types.
pub mod tool;

pub use gate::{AutoProceed, CheckpointEvent, CheckpointKind, GateDecision, HumanGate};
pub use message::{Message, Role};
pub use tool::{ToolCall, ToolResult};

/// Top-level error type for the Taskweave orchestration core.
///
/// Variants split into two families: recoverable failures that the
/// orchestration loop reports back to the model as error tool-results, and
/// terminal failures (see [`WeaveError::is_terminal`]) that end the run with
/// partial state intact.
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// A virtual-filesystem lookup for a path that was never written, or a
    /// directory that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A subagent dispatch named a role absent from the registry.
    #[error("unknown subagent role: {0}")]
    UnknownRole(String),

    /// A dispatch would nest deeper than the configured ceiling. Raised
    /// before the child executes.
    #[error("delegation depth {attempted} exceeds maximum {max}")]
    DepthExceeded {
        /// The depth the rejected dispatch would have reached.
        attempted: u32,
        /// The configured ceiling.
        max: u32,
    },

    /// The run consumed its step budget. Terminal, never retried.
    #[error("step limit of {0} reached")]
    StepLimitExceeded(u32),

    /// A human checkpoint aborted the gated operation.
    #[error("aborted by human checkpoint: {0}")]
    HumanAborted(String),

    /// The run was cancelled at a step boundary.
    #[error("run cancelled")]
    Cancelled,

    /// A tool implementation failed in a way it could not express as an
    /// error tool-result.
    #[error("tool error: {0}")]
    Tool(String),

    /// The model-invocation collaborator failed or timed out.
    #[error("model error: {0}")]
    Model(String),

    /// A whole-list todo replacement was rejected by validation.
    #[error("invalid todo list: {0}")]
    InvalidTodos(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WeaveError {
    /// Whether this error ends the current run rather than being reported
    /// back to the model as a recoverable tool-result.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WeaveError::DepthExceeded { .. }
                | WeaveError::StepLimitExceeded(_)
                | WeaveError::HumanAborted(_)
                | WeaveError::Cancelled
        )
    }
}

/// A convenience `Result` alias using [`WeaveError`].
pub type WeaveResult<T> = Result<T, WeaveError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(WeaveError::DepthExceeded { attempted: 2, max: 1 }.is_terminal());
        assert!(WeaveError::StepLimitExceeded(50).is_terminal());
        assert!(WeaveError::HumanAborted("edit".into()).is_terminal());
        assert!(WeaveError::Cancelled.is_terminal());

        assert!(!WeaveError::NotFound("/a.txt".into()).is_terminal());
        assert!(!WeaveError::UnknownRole("tester".into()).is_terminal());
        assert!(!WeaveError::Tool("boom".into()).is_terminal());
        assert!(!WeaveError::Model("timeout".into()).is_terminal());
    }

    #[test]
    fn test_error_display() {
        let err = WeaveError::DepthExceeded { attempted: 3, max: 2 };
        assert_eq!(err.to_string(), "delegation depth 3 exceeds maximum 2");
        let err = WeaveError::NotFound("/missing.txt".into());
        assert!(err.to_string().contains("/missing.txt"));
    }
}
