//! Task store: the single owner of the task collection.
//!
//! # Responsibility
//! - Provide every CRUD, toggle, and reorder operation over tasks and
//!   subtasks.
//! - Maintain the sort order and auto-completion invariants, and persist
//!   write-through after every mutation.
//!
//! # Invariants
//! - The collection is re-sorted immediately before every save, so the
//!   persisted document is always ordered.
//! - A task with subtasks is completed exactly when all of them are; this
//!   is re-derived on every subtask toggle.
//! - No mutation path bypasses `persist`.

use crate::model::defaults::starter_tasks;
use crate::model::ids::{epoch_millis_now, IdGenerator};
use crate::model::task::{Subtask, SubtaskId, Task, TaskId, Urgency};
use crate::prefs::{CompletionAction, PreferenceProvider};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::info;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Service-level error for task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Persistence failed; the in-memory collection is still consistent.
    Repo(RepoError),
    /// Task text must be non-empty at creation.
    EmptyText,
    /// Strict-policy miss on a task id.
    TaskNotFound(TaskId),
    /// Strict-policy miss on a subtask id within an existing parent.
    SubtaskNotFound { parent: TaskId, subtask: SubtaskId },
    /// Reorder index outside the live sequence.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::SubtaskNotFound { parent, subtask } => {
                write!(f, "subtask not found: {subtask} (parent {parent})")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// How operations referencing a missing task/subtask id behave.
///
/// `Lenient` keeps them silent no-ops; `Strict` turns them into
/// `TaskNotFound`/`SubtaskNotFound` errors for callers that prefer loud
/// misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingIdPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Outcome signal of `toggle_subtask`, driving the caller's redraw choice.
///
/// `parent_auto_changed` reports that the parent's completion flipped as a
/// side effect. `needs_full_refresh` additionally reports that the parent
/// may have moved (sink) or left the active view (archive), so a surgical
/// patch of the toggled row is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubtaskToggle {
    pub parent_auto_changed: bool,
    pub needs_full_refresh: bool,
}

/// Input for `add_task`.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub text: String,
    pub urgency: Urgency,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial field set for `update_task`; unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub urgency: Option<Urgency>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
    pub archived: Option<bool>,
}

/// In-memory task collection with write-through persistence.
///
/// Single-actor by design: operations run to completion synchronously and
/// there is no internal locking.
pub struct TaskStore<R: TaskRepository, P: PreferenceProvider> {
    repo: R,
    prefs: P,
    policy: MissingIdPolicy,
    ids: IdGenerator,
    tasks: Vec<Task>,
}

impl<R: TaskRepository, P: PreferenceProvider> TaskStore<R, P> {
    /// Loads the persisted collection, seeding the starter set when nothing
    /// usable is stored, with the default lenient missing-id policy.
    pub fn open(repo: R, prefs: P) -> StoreResult<Self> {
        Self::with_policy(repo, prefs, MissingIdPolicy::default())
    }

    /// Same as `open`, with an explicit missing-id policy.
    pub fn with_policy(repo: R, prefs: P, policy: MissingIdPolicy) -> StoreResult<Self> {
        let mut store = Self {
            repo,
            prefs,
            policy,
            ids: IdGenerator::new(),
            tasks: Vec::new(),
        };

        match store.repo.load_collection()? {
            Some(tasks) => {
                store.tasks = tasks;
                // The document was sorted at write time, but the completion
                // preference may have changed since; order the live view now.
                store.sort_tasks();
                info!(
                    "event=collection_load module=store status=ok count={}",
                    store.tasks.len()
                );
            }
            None => {
                store.tasks = starter_tasks(epoch_millis_now());
                store.persist()?;
                info!(
                    "event=collection_seed module=store status=ok count={}",
                    store.tasks.len()
                );
            }
        }

        store.ids = IdGenerator::seeded(&store.tasks);
        Ok(store)
    }

    /// Live collection, ordered by the sort rule.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up one task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Tasks in the main view.
    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.is_archived)
    }

    /// Tasks in the archive view.
    pub fn archived_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.is_archived)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a new task from `draft` and returns the created record.
    pub fn add_task(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        if draft.text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }

        let task = Task::new(
            self.ids.next(),
            draft.text,
            draft.urgency,
            draft.tags,
            epoch_millis_now(),
        );
        self.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Removes a task and its whole subtask sequence.
    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<()> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            self.missing_task(id)?;
        }
        self.persist()
    }

    /// Merges `patch` into the task matching `id`.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<()> {
        let index = match self.task_index(id) {
            Some(index) => index,
            None => {
                self.missing_task(id)?;
                return self.persist();
            }
        };

        let task = &mut self.tasks[index];
        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(urgency) = patch.urgency {
            task.urgency = urgency;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(archived) = patch.archived {
            task.is_archived = archived;
        }

        self.persist()
    }

    /// Flips a task's completion; completing under the archive preference
    /// also archives it in the same operation.
    pub fn toggle_task(&mut self, id: TaskId) -> StoreResult<()> {
        let index = match self.task_index(id) {
            Some(index) => index,
            None => {
                self.missing_task(id)?;
                return self.persist();
            }
        };

        let archive_on_complete = self.prefs.completion_action() == CompletionAction::Archive;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        if task.completed && archive_on_complete {
            task.is_archived = true;
        }

        self.persist()
    }

    /// Appends an empty, editing-state subtask to `parent`.
    ///
    /// Returns the new subtask id, or `None` when the parent is missing
    /// under the lenient policy.
    pub fn add_subtask(&mut self, parent: TaskId) -> StoreResult<Option<SubtaskId>> {
        let index = match self.task_index(parent) {
            Some(index) => index,
            None => {
                self.missing_task(parent)?;
                self.persist()?;
                return Ok(None);
            }
        };

        let id = self.ids.next();
        self.tasks[index].subtasks.push(Subtask::draft(id));
        self.persist()?;
        Ok(Some(id))
    }

    /// Commits a subtask edit: blank text deletes the subtask, anything
    /// else becomes its text and ends the editing state.
    pub fn save_subtask(
        &mut self,
        parent: TaskId,
        subtask: SubtaskId,
        text: impl Into<String>,
    ) -> StoreResult<()> {
        let text = text.into();
        let parent_index = match self.task_index(parent) {
            Some(index) => index,
            None => {
                self.missing_task(parent)?;
                return self.persist();
            }
        };

        match self.subtask_index(parent_index, subtask) {
            Some(sub_index) if text.trim().is_empty() => {
                self.tasks[parent_index].subtasks.remove(sub_index);
            }
            Some(sub_index) => {
                let sub = &mut self.tasks[parent_index].subtasks[sub_index];
                sub.text = text;
                sub.is_editing = false;
            }
            None => self.missing_subtask(parent, subtask)?,
        }

        self.persist()
    }

    /// Flips a subtask's completion and re-derives the parent's.
    ///
    /// The returned signal tells the caller whether the parent flipped as a
    /// side effect and whether a full re-render is required (sink/archive
    /// preferences move the parent out of its rendered position).
    pub fn toggle_subtask(
        &mut self,
        parent: TaskId,
        subtask: SubtaskId,
    ) -> StoreResult<SubtaskToggle> {
        let parent_index = match self.task_index(parent) {
            Some(index) => index,
            None => {
                self.missing_task(parent)?;
                self.persist()?;
                return Ok(SubtaskToggle::default());
            }
        };
        let sub_index = match self.subtask_index(parent_index, subtask) {
            Some(index) => index,
            None => {
                self.missing_subtask(parent, subtask)?;
                self.persist()?;
                return Ok(SubtaskToggle::default());
            }
        };

        let action = self.prefs.completion_action();
        let task = &mut self.tasks[parent_index];
        let sub = &mut task.subtasks[sub_index];
        sub.completed = !sub.completed;

        let mut outcome = SubtaskToggle::default();
        if task.refresh_completion() {
            outcome.parent_auto_changed = true;
            if matches!(action, CompletionAction::Sink | CompletionAction::Archive) {
                outcome.needs_full_refresh = true;
                if action == CompletionAction::Archive && task.completed {
                    task.is_archived = true;
                }
            }
        }

        self.persist()?;
        Ok(outcome)
    }

    /// Removes one subtask from its parent's sequence.
    pub fn delete_subtask(&mut self, parent: TaskId, subtask: SubtaskId) -> StoreResult<()> {
        let parent_index = match self.task_index(parent) {
            Some(index) => index,
            None => {
                self.missing_task(parent)?;
                return self.persist();
            }
        };

        match self.subtask_index(parent_index, subtask) {
            Some(sub_index) => {
                self.tasks[parent_index].subtasks.remove(sub_index);
            }
            None => self.missing_subtask(parent, subtask)?,
        }

        self.persist()
    }

    /// Moves the task at `from` to position `to`.
    ///
    /// The move is durable only among equal sort keys: the re-sort on
    /// persist preserves relative order within a tier but never across
    /// tiers.
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> StoreResult<()> {
        check_index(from, self.tasks.len())?;
        check_index(to, self.tasks.len())?;

        let moved = self.tasks.remove(from);
        self.tasks.insert(to, moved);
        self.persist()
    }

    /// Moves one subtask of `parent` from `from` to `to`.
    pub fn reorder_subtasks(&mut self, parent: TaskId, from: usize, to: usize) -> StoreResult<()> {
        let parent_index = match self.task_index(parent) {
            Some(index) => index,
            None => {
                self.missing_task(parent)?;
                return self.persist();
            }
        };

        let subtasks = &mut self.tasks[parent_index].subtasks;
        check_index(from, subtasks.len())?;
        check_index(to, subtasks.len())?;

        let moved = subtasks.remove(from);
        subtasks.insert(to, moved);
        self.persist()
    }

    /// Current completion preference, exposed for rendering decisions.
    pub fn completion_action(&self) -> CompletionAction {
        self.prefs.completion_action()
    }

    /// Re-sorts and writes the whole collection.
    ///
    /// Re-sorting unconditionally (not only after reorder) keeps every
    /// urgency or preference change consistent without selective
    /// invalidation; the collection is a single user's task list, so the
    /// sort cost is negligible.
    fn persist(&mut self) -> StoreResult<()> {
        self.sort_tasks();
        self.repo.save_collection(&self.tasks)?;
        Ok(())
    }

    /// Stable sort: completion status first when the sink preference is
    /// active (incomplete before completed), urgency weight descending
    /// otherwise and as the secondary key. Equal keys keep their relative
    /// order so manual reordering survives.
    fn sort_tasks(&mut self) {
        let sink = self.prefs.completion_action() == CompletionAction::Sink;
        self.tasks.sort_by(|a, b| {
            let by_completion = if sink {
                a.completed.cmp(&b.completed)
            } else {
                Ordering::Equal
            };
            by_completion.then_with(|| b.urgency.weight().cmp(&a.urgency.weight()))
        });
    }

    fn task_index(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn subtask_index(&self, parent_index: usize, id: SubtaskId) -> Option<usize> {
        self.tasks[parent_index]
            .subtasks
            .iter()
            .position(|sub| sub.id == id)
    }

    fn missing_task(&self, id: TaskId) -> StoreResult<()> {
        match self.policy {
            MissingIdPolicy::Lenient => Ok(()),
            MissingIdPolicy::Strict => Err(StoreError::TaskNotFound(id)),
        }
    }

    fn missing_subtask(&self, parent: TaskId, subtask: SubtaskId) -> StoreResult<()> {
        match self.policy {
            MissingIdPolicy::Lenient => Ok(()),
            MissingIdPolicy::Strict => Err(StoreError::SubtaskNotFound { parent, subtask }),
        }
    }
}

fn check_index(index: usize, len: usize) -> StoreResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(StoreError::IndexOutOfRange { index, len })
    }
}
