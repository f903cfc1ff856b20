//! Checkpoint types for human-in-the-loop (HITL) supervision.
//!
//! The gate is the single extension point through which a host can supervise
//! mutating operations. The orchestration loop consults the configured
//! [`HumanGate`] before designated operations (file writes and edits,
//! subagent dispatch); with no gate configured every checkpoint proceeds.

use crate::WeaveResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The category of mutating operation a checkpoint guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    /// Writing a new version of a file.
    FileWrite,
    /// A targeted in-file replacement.
    FileEdit,
    /// Copying a file to a new path.
    FileCopy,
    /// Delegating a task to a subagent.
    SubagentDispatch,
}

/// A checkpoint presented to a human reviewer before a mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointEvent {
    /// The operation category being gated.
    pub kind: CheckpointKind,
    /// Human-readable description of the pending operation.
    pub description: String,
}

impl CheckpointEvent {
    /// Creates a checkpoint event.
    pub fn new(kind: CheckpointKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// The decision returned from a checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Apply the operation unchanged.
    Proceed,
    /// Apply the operation with a reviewer-modified payload.
    Modify(serde_json::Value),
    /// Fail the operation with `HumanAborted`; nothing is partially applied.
    Abort {
        /// Optional reviewer-supplied reason.
        reason: Option<String>,
    },
}

/// Gate through which checkpoint events are sent and decisions received.
/// Implementations can be CLI prompts, WebSocket handlers, review queues, etc.
#[async_trait]
pub trait HumanGate: Send + Sync {
    /// Present `event` and the operation's `payload` (its tool arguments)
    /// and wait for a decision.
    async fn checkpoint(
        &self,
        event: CheckpointEvent,
        payload: &serde_json::Value,
    ) -> WeaveResult<GateDecision>;
}

/// Default gate used when no callback is configured: every checkpoint
/// proceeds untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoProceed;

#[async_trait]
impl HumanGate for AutoProceed {
    async fn checkpoint(
        &self,
        _event: CheckpointEvent,
        _payload: &serde_json::Value,
    ) -> WeaveResult<GateDecision> {
        Ok(GateDecision::Proceed)
    }
}
