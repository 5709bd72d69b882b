//! Application-state store with reducer-style transitions.
//!
//! # Design
//! All UI state lives in one `AppState`. Nothing mutates it except
//! `AppState::apply`, which takes one `Action` describing what happened
//! (a request was issued, a response settled, the user typed). After every
//! transition the filtered view is re-derived from the canonical list, so the
//! two can never drift apart.
//!
//! Optimistic inserts are two-phase: `AddRequested` carries a provisional
//! todo that is shown and marked busy but is not part of the canonical list;
//! `AddSucceeded` commits the server's todo in its place and `AddFailed`
//! drops it.
//!
//! Time enters only through the `now` argument, which the banner deadline is
//! computed from. `Store` supplies `tokio::time::Instant::now()` so paused
//! runtime clocks drive expiry in tests.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::Failure;
use crate::filter::Filter;
use crate::types::{Todo, TodoId};

/// How long an error banner stays up.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(3);

/// Everything that can happen to the application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadSucceeded(Vec<Todo>),
    LoadFailed,

    TitleChanged(String),
    /// The composer was submitted with a blank title.
    AddRejected,
    AddRequested(Todo),
    AddSucceeded { provisional_id: TodoId, todo: Todo },
    AddFailed { provisional_id: TodoId },

    UpdateRequested(TodoId),
    UpdateSucceeded(Todo),
    UpdateFailed(TodoId),

    DeleteRequested(TodoId),
    DeleteSucceeded(TodoId),
    DeleteFailed(TodoId),

    /// Bulk operations (toggle all, clear completed) mark every id at once.
    BatchRequested(Vec<TodoId>),
    /// One failure covers the whole batch.
    BatchSettled { ids: Vec<TodoId>, failure: Option<Failure> },

    FilterSelected(Filter),

    EditStarted(TodoId),
    EditChanged(String),
    EditClosed,

    ErrorExpired { generation: u64 },
    ErrorDismissed,
}

/// The transient error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorBanner {
    pub failure: Failure,
    pub generation: u64,
    pub expires_at: Instant,
}

impl ErrorBanner {
    pub fn message(&self) -> String {
        self.failure.message()
    }
}

/// An inline title edit in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit {
    pub id: TodoId,
    pub draft: String,
}

/// State of the "new todo" input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    pub title: String,
    pub submitting: bool,
    pub focus_requested: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            title: String::new(),
            submitting: false,
            focus_requested: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    todos: Vec<Todo>,
    provisional: Vec<Todo>,
    filtered: Vec<Todo>,
    filter: Filter,
    editing: BTreeSet<TodoId>,
    error: Option<ErrorBanner>,
    error_generation: u64,
    footer_armed: bool,
    composer: Composer,
    inline_edit: Option<InlineEdit>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical list as last confirmed by the server.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// What the list view shows: the canonical list under the current filter,
    /// followed by any provisional todos the filter admits.
    pub fn filtered(&self) -> &[Todo] {
        &self.filtered
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn editing(&self) -> &BTreeSet<TodoId> {
        &self.editing
    }

    pub fn is_busy(&self, id: TodoId) -> bool {
        self.editing.contains(&id)
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    /// Whether the footer renders. Armed by a non-empty load, disarmed
    /// whenever the canonical list becomes empty.
    pub fn footer_visible(&self) -> bool {
        self.footer_armed
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn inline_edit(&self) -> Option<&InlineEdit> {
        self.inline_edit.as_ref()
    }

    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn all_completed(&self) -> bool {
        self.todos.iter().all(|t| t.completed)
    }

    pub fn any_completed(&self) -> bool {
        self.todos.iter().any(|t| t.completed)
    }

    /// Locally-guessed id for an optimistic insert.
    pub fn next_provisional_id(&self) -> TodoId {
        self.todos
            .iter()
            .chain(&self.provisional)
            .map(|t| t.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::LoadSucceeded(todos) => {
                if !todos.is_empty() {
                    self.footer_armed = true;
                }
                self.todos = todos;
            }
            Action::LoadFailed => self.raise(Failure::LoadFailed, now),

            Action::TitleChanged(title) => {
                self.composer.title = title;
                self.composer.focus_requested = false;
            }
            Action::AddRejected => {
                self.composer.focus_requested = true;
                self.raise(Failure::EmptyTitle, now);
            }
            Action::AddRequested(todo) => {
                self.composer.submitting = true;
                self.editing.insert(todo.id);
                self.provisional.push(todo);
            }
            Action::AddSucceeded { provisional_id, todo } => {
                self.settle_provisional(provisional_id);
                self.todos.push(todo);
                self.composer.title.clear();
            }
            Action::AddFailed { provisional_id } => {
                self.settle_provisional(provisional_id);
                self.raise(Failure::AddFailed, now);
            }

            Action::UpdateRequested(id) | Action::DeleteRequested(id) => {
                self.editing.insert(id);
            }
            Action::UpdateSucceeded(todo) => {
                self.editing.remove(&todo.id);
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
                    *slot = todo;
                }
            }
            Action::UpdateFailed(id) => {
                self.editing.remove(&id);
                self.raise(Failure::UpdateFailed, now);
            }
            Action::DeleteSucceeded(id) => {
                self.editing.remove(&id);
                self.todos.retain(|t| t.id != id);
                if self.inline_edit.as_ref().is_some_and(|e| e.id == id) {
                    self.inline_edit = None;
                }
            }
            Action::DeleteFailed(id) => {
                self.editing.remove(&id);
                self.raise(Failure::DeleteFailed, now);
            }

            Action::BatchRequested(ids) => self.editing.extend(ids),
            Action::BatchSettled { ids, failure } => {
                for id in &ids {
                    self.editing.remove(id);
                }
                if let Some(failure) = failure {
                    self.raise(failure, now);
                }
            }

            Action::FilterSelected(filter) => self.filter = filter,

            Action::EditStarted(id) => {
                if let Some(todo) = self.find(id) {
                    self.inline_edit = Some(InlineEdit {
                        id,
                        draft: todo.title.clone(),
                    });
                    self.composer.focus_requested = false;
                }
            }
            Action::EditChanged(draft) => {
                if let Some(edit) = self.inline_edit.as_mut() {
                    edit.draft = draft;
                }
            }
            Action::EditClosed => {
                self.inline_edit = None;
                self.composer.focus_requested = true;
            }

            Action::ErrorExpired { generation } => {
                if self.error.is_some_and(|e| e.generation == generation) {
                    self.error = None;
                }
            }
            Action::ErrorDismissed => self.error = None,
        }
        self.derive();
    }

    fn settle_provisional(&mut self, provisional_id: TodoId) {
        self.provisional.retain(|t| t.id != provisional_id);
        self.editing.remove(&provisional_id);
        self.composer.submitting = false;
        self.composer.focus_requested = true;
    }

    fn raise(&mut self, failure: Failure, now: Instant) {
        self.error_generation += 1;
        self.error = Some(ErrorBanner {
            failure,
            generation: self.error_generation,
            expires_at: now + ERROR_DISPLAY,
        });
    }

    fn derive(&mut self) {
        if self.todos.is_empty() {
            self.footer_armed = false;
        }
        let filter = self.filter;
        self.filtered = filter.apply(&self.todos);
        self.filtered
            .extend(self.provisional.iter().filter(|t| filter.matches(t)).cloned());
    }
}

/// Owns the `AppState` and is the only way to change it.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(?action, "dispatch");
        self.state.apply(action, Instant::now());
    }
}
