//! Built-in state-mutating tools and the tool registry.
//!
//! Tools are the only way the model (or a subagent) touches run state: each
//! tool receives the [`taskweave_state::StateContainer`] by mutable
//! reference, applies its operation through the state types' own APIs, and
//! reports back as a [`taskweave_core::ToolResult`]. User-level problems
//! (missing file, ambiguous edit string) come back as error tool-results the
//! model can react to; only infrastructure failures surface as `Err`.

/// Built-in tool implementations.
pub mod builtins;
/// Name-indexed tool lookup table.
pub mod registry;
/// The `Tool` trait and descriptor.
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDescriptor};
