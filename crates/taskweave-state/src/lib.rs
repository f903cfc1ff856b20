//! Shared mutable state for a Taskweave run.
//!
//! This crate holds the three pieces of state the orchestration graph
//! threads through every step — the todo list, the versioned virtual
//! filesystem, and the conversation transcript — aggregated into a single
//! [`StateContainer`]. The container is the only shared mutable resource in
//! a run: writers are serialized by the step loop, and subagents operate on
//! isolated forks created with [`StateContainer::child`].
//!
//! # Main types
//!
//! - [`TodoItem`] / [`TodoList`] — ordered plan items with atomic
//!   whole-list replacement.
//! - [`FileRecord`] / [`Vfs`] — in-memory versioned filesystem.
//! - [`StateContainer`] — the single unit of truth for a run.

/// State container aggregating todos, files, and messages.
pub mod container;
/// Todo list tracker.
pub mod todos;
/// Versioned virtual filesystem.
pub mod vfs;

pub use container::StateContainer;
pub use todos::{TodoItem, TodoList, TodoStatus};
pub use vfs::{FileEntry, FileRecord, FileVersion, Vfs};
