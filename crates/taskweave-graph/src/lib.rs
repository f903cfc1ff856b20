//! The orchestration graph: the top-level control loop composing a primary
//! agent with delegated subagents over shared state.
//!
//! The loop advances one step at a time — ask the model for the next action,
//! route tool calls against the [`taskweave_state::StateContainer`], record
//! results, check the run guard — until the model produces a final answer or
//! a terminal condition trips. Subagent dispatches fork an isolated child
//! context, run the same loop recursively, and merge only file deltas back.
//!
//! # Main types
//!
//! - [`AgentGraph`] — the orchestrator; build one per configured agent.
//! - [`GraphConfig`] / [`RunLimits`] — run configuration and ceilings.
//! - [`ModelClient`] / [`ModelAction`] — the opaque model-invocation seam.
//! - [`SubagentRegistry`] / [`SubagentResult`] — delegation roles and their
//!   per-dispatch outcome.
//! - [`RunGuard`] — depth and step ceiling enforcement.

/// Run configuration.
pub mod config;
/// Recursion/depth guard.
pub mod guard;
/// Model-invocation seam.
pub mod model;
/// The orchestration loop and subagent dispatcher.
pub mod runner;
/// Subagent definitions and registry.
pub mod subagent;

pub use config::{GraphConfig, RunLimits};
pub use guard::RunGuard;
pub use model::{ModelAction, ModelClient};
pub use runner::{AgentGraph, RunOutcome, TASK_TOOL};
pub use subagent::{SubagentDefinition, SubagentRegistry, SubagentResult, SubagentStatus};
