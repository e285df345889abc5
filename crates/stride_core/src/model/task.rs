//! Task and subtask domain records.
//!
//! # Responsibility
//! - Define the persisted shape of tasks and subtasks.
//! - Provide completion helpers used by the store's invariant maintenance.
//!
//! # Invariants
//! - `id` and `created_at` are immutable after creation.
//! - A task with a non-empty subtask list is completed exactly when every
//!   subtask is completed; `refresh_completion` is the single maintenance
//!   point for that rule.
//! - Serialized field names (`isArchived`, `createdAt`, `isEditing`) match
//!   the legacy persisted document and must not be renamed.

use serde::{Deserialize, Serialize};

/// Stable identifier for a top-level task.
pub type TaskId = i64;

/// Stable identifier for a subtask within its parent's sequence.
pub type SubtaskId = i64;

/// Ordinal priority label; the primary sort key for the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// No explicit priority.
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Sort weight: high=3, medium=2, low=1, none=0.
    pub fn weight(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::None => 0,
        }
    }
}

/// One entry of a task's ordered subtask sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    /// May be empty only while `is_editing` is set.
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Transient edit marker; true only between creation and first save.
    #[serde(rename = "isEditing", default)]
    pub is_editing: bool,
}

impl Subtask {
    /// Creates an empty subtask in editing state, as produced by
    /// `TaskStore::add_subtask`.
    pub fn draft(id: SubtaskId) -> Self {
        Self {
            id,
            text: String::new(),
            completed: false,
            is_editing: true,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    /// Archived tasks stay in the collection and render in a separate view.
    #[serde(rename = "isArchived", default)]
    pub is_archived: bool,
    /// Epoch milliseconds; display-only after creation.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Creates a fresh, incomplete, unarchived task with no subtasks.
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        urgency: Urgency,
        tags: Vec<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            urgency,
            tags,
            completed: false,
            is_archived: false,
            created_at,
            subtasks: Vec::new(),
        }
    }

    /// Looks up one subtask by id.
    pub fn subtask(&self, id: SubtaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|sub| sub.id == id)
    }

    /// Re-derives `completed` from the subtask set.
    ///
    /// Only meaningful for tasks with at least one subtask; an empty set
    /// leaves `completed` under direct-toggle control and this is a no-op.
    /// Returns whether the task's `completed` flag changed.
    pub fn refresh_completion(&mut self) -> bool {
        if self.subtasks.is_empty() {
            return false;
        }
        let all_done = self.subtasks.iter().all(|sub| sub.completed);
        if self.completed == all_done {
            return false;
        }
        self.completed = all_done;
        true
    }
}
