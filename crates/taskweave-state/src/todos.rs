use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskweave_core::{WeaveError, WeaveResult};
use uuid::Uuid;

/// Status of a single plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started yet.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Cannot proceed until something else changes.
    Blocked,
}

/// A single plan item surfaced to the host as progress feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier for this item.
    pub id: Uuid,
    /// What needs doing.
    pub description: String,
    /// Current status.
    pub status: TodoStatus,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was completed, if it was.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    /// Creates a pending item with the given description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            status: TodoStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Sets the status, stamping `completed_at` when it becomes completed.
    pub fn with_status(mut self, status: TodoStatus) -> Self {
        if status == TodoStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        self.status = status;
        self
    }
}

/// Ordered task list with an atomic whole-list replacement API.
///
/// No item-level mutation is exposed: the caller rewrites the entire plan on
/// every update, so readers always see a fully consistent snapshot and
/// orphaned or duplicate items cannot accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swaps the entire list.
    ///
    /// Any item with an empty description rejects the whole call with
    /// [`WeaveError::InvalidTodos`], leaving the prior list intact.
    pub fn replace(&mut self, items: Vec<TodoItem>) -> WeaveResult<()> {
        if let Some(bad) = items.iter().find(|t| t.description.trim().is_empty()) {
            return Err(WeaveError::InvalidTodos(format!(
                "item {} has an empty description",
                bad.id
            )));
        }
        self.items = items;
        Ok(())
    }

    /// Read-only snapshot of the current plan.
    pub fn current(&self) -> &[TodoItem] {
        &self.items
    }

    /// Drops all items. Called when a new top-level task begins.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of items in the plan.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
