//! Preference provider contract consumed by the task store.
//!
//! # Responsibility
//! - Expose the single personalization read the core depends on: what
//!   happens to a task when it becomes complete.
//!
//! # Invariants
//! - The store receives its provider by injection at construction; core
//!   code never reaches into ambient/global preference state.
//! - Providers are single-threaded (`Cell`, not atomics), matching the
//!   store's single-actor model.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// What a completed task does: stay in place, sink below incomplete tasks,
/// or move straight to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionAction {
    #[default]
    Stay,
    Sink,
    Archive,
}

/// Read-only view of the completion preference.
///
/// The store consults this on every completion-affecting mutation, so a
/// provider backed by live settings takes effect immediately.
pub trait PreferenceProvider {
    fn completion_action(&self) -> CompletionAction;
}

/// A fixed action is itself a provider; convenient for tests and embedders
/// without a settings screen.
impl PreferenceProvider for CompletionAction {
    fn completion_action(&self) -> CompletionAction {
        *self
    }
}

impl<P: PreferenceProvider + ?Sized> PreferenceProvider for Rc<P> {
    fn completion_action(&self) -> CompletionAction {
        (**self).completion_action()
    }
}

impl<'a, P: PreferenceProvider + ?Sized> PreferenceProvider for &'a P {
    fn completion_action(&self) -> CompletionAction {
        (**self).completion_action()
    }
}

/// Interior-mutable provider for embedders that let the user change the
/// setting mid-session; share it with the store via `Rc`.
#[derive(Debug, Default)]
pub struct SessionPreferences {
    action: Cell<CompletionAction>,
}

impl SessionPreferences {
    pub fn new(action: CompletionAction) -> Self {
        Self {
            action: Cell::new(action),
        }
    }

    pub fn set_completion_action(&self, action: CompletionAction) {
        self.action.set(action);
    }
}

impl PreferenceProvider for SessionPreferences {
    fn completion_action(&self) -> CompletionAction {
        self.action.get()
    }
}
