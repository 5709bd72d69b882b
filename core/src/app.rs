//! Root controller: turns user intents into network calls and store actions.
//!
//! # Design
//! `TodoApp` owns the `Store` and a `TodoApi`. Each public operation runs in
//! three steps: under the store lock it checks the state and dispatches a
//! "requested" action, then it releases the lock and awaits the network, then
//! it re-locks to dispatch the matching "succeeded"/"failed" action. The lock
//! is never held across an await, so operations take `&self`, may run
//! concurrently, and renders see the busy set while requests are in flight.
//!
//! Nothing is returned to the caller: failures end up as the error banner and
//! as the reversal of whatever optimistic change the operation made.
//!
//! Bulk operations fan out with `join_all` and report one aggregate failure.
//! Ids already marked busy are skipped by user-initiated actions; in-flight
//! requests are never cancelled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::time::{sleep_until, Instant};

use crate::error::{ApiError, Failure};
use crate::filter::Filter;
use crate::store::{Action, AppState, Store};
use crate::transport::{TodoApi, Transport};
use crate::types::{Todo, TodoId};

pub struct TodoApp<T> {
    api: TodoApi<T>,
    store: Mutex<Store>,
}

impl<T: Transport> TodoApp<T> {
    pub fn new(api: TodoApi<T>) -> Self {
        Self {
            api,
            store: Mutex::new(Store::new()),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.with_state(AppState::clone)
    }

    /// Run `f` against the current state without copying it.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(self.store().state())
    }

    pub fn api(&self) -> &TodoApi<T> {
        &self.api
    }

    /// Fetch the canonical list. Also used to resynchronise after bulk
    /// operations.
    pub async fn load(&self) {
        match self.api.list().await {
            Ok(todos) => {
                tracing::info!(count = todos.len(), "todos loaded");
                self.dispatch(Action::LoadSucceeded(todos));
            }
            Err(err) => {
                report(Failure::LoadFailed, &err);
                self.dispatch(Action::LoadFailed);
            }
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.dispatch(Action::TitleChanged(title.into()));
    }

    /// Submit the composer. Blank titles never reach the network.
    pub async fn add_todo(&self) {
        let pending = {
            let mut store = self.store();
            let composer = store.state().composer();
            if composer.submitting {
                return;
            }
            let title = composer.title.trim().to_string();
            if title.is_empty() {
                store.dispatch(Action::AddRejected);
                return;
            }
            let provisional = Todo {
                id: store.state().next_provisional_id(),
                title,
                completed: false,
                user_id: self.api.client().user_id(),
            };
            let pending = (provisional.id, provisional.title.clone());
            store.dispatch(Action::AddRequested(provisional));
            pending
        };
        let (provisional_id, title) = pending;

        match self.api.create(&title).await {
            Ok(todo) => {
                tracing::info!(id = todo.id, "todo added");
                self.dispatch(Action::AddSucceeded { provisional_id, todo });
            }
            Err(err) => {
                report(Failure::AddFailed, &err);
                self.dispatch(Action::AddFailed { provisional_id });
            }
        }
    }

    /// Convenience for hosts that submit the title in one step.
    pub async fn add_titled(&self, title: impl Into<String>) {
        self.set_title(title);
        self.add_todo().await;
    }

    /// Complete everything, or reopen everything when all are already done.
    pub async fn toggle_all(&self) {
        let targets: Vec<Todo> = {
            let mut store = self.store();
            let state = store.state();
            let all_completed = state.all_completed();
            let targets: Vec<Todo> = state
                .todos()
                .iter()
                .filter(|t| all_completed || !t.completed)
                .filter(|t| !state.is_busy(t.id))
                .map(Todo::toggled)
                .collect();
            if targets.is_empty() {
                return;
            }
            store.dispatch(Action::BatchRequested(targets.iter().map(|t| t.id).collect()));
            targets
        };

        let results = join_all(targets.iter().map(|t| self.api.update(t))).await;
        let failure = aggregate(results, Failure::ToggleAllFailed);
        let ids = targets.iter().map(|t| t.id).collect();
        self.dispatch(Action::BatchSettled { ids, failure });
        self.load().await;
    }

    pub async fn toggle(&self, id: TodoId) {
        let Some(todo) = self.claim(id, Action::UpdateRequested) else {
            return;
        };
        self.send_update(todo.toggled()).await;
    }

    pub fn start_edit(&self, id: TodoId) {
        let mut store = self.store();
        if store.state().is_busy(id) {
            return;
        }
        store.dispatch(Action::EditStarted(id));
    }

    pub fn edit_draft(&self, draft: impl Into<String>) {
        self.dispatch(Action::EditChanged(draft.into()));
    }

    pub fn cancel_edit(&self) {
        self.dispatch(Action::EditClosed);
    }

    /// Commit the inline edit: a blank title deletes the todo, an unchanged
    /// one is discarded, anything else is saved. A todo that is already busy
    /// is left alone.
    pub async fn submit_edit(&self) {
        let Some(edit) = self.with_state(|s| s.inline_edit().cloned()) else {
            return;
        };
        self.dispatch(Action::EditClosed);

        let title = edit.draft.trim();
        if title.is_empty() {
            self.delete(edit.id).await;
            return;
        }
        let Some(todo) = self.claim_if(edit.id, Action::UpdateRequested, |t| t.title != title)
        else {
            return;
        };
        self.send_update(todo.retitled(title)).await;
    }

    pub async fn delete(&self, id: TodoId) {
        if self.claim(id, Action::DeleteRequested).is_none() {
            return;
        }
        match self.api.delete(id).await {
            Ok(()) => {
                tracing::info!(id, "todo deleted");
                self.dispatch(Action::DeleteSucceeded(id));
            }
            Err(err) => {
                report(Failure::DeleteFailed, &err);
                self.dispatch(Action::DeleteFailed(id));
            }
        }
    }

    pub fn select_filter(&self, filter: Filter) {
        self.dispatch(Action::FilterSelected(filter));
    }

    /// Delete every completed todo, then resynchronise with the server.
    pub async fn clear_completed(&self) {
        let ids: Vec<TodoId> = {
            let mut store = self.store();
            let state = store.state();
            let ids: Vec<TodoId> = state
                .todos()
                .iter()
                .filter(|t| t.completed && !state.is_busy(t.id))
                .map(|t| t.id)
                .collect();
            if ids.is_empty() {
                return;
            }
            store.dispatch(Action::BatchRequested(ids.clone()));
            ids
        };

        let results = join_all(ids.iter().map(|&id| self.api.delete(id))).await;
        let failure = aggregate(results, Failure::DeleteFailed);
        self.dispatch(Action::BatchSettled { ids, failure });
        self.load().await;
    }

    pub fn dismiss_error(&self) {
        self.dispatch(Action::ErrorDismissed);
    }

    /// Expire the banner if its deadline has passed.
    pub fn tick(&self) {
        let mut store = self.store();
        if let Some(banner) = store.state().error().copied() {
            if Instant::now() >= banner.expires_at {
                store.dispatch(Action::ErrorExpired {
                    generation: banner.generation,
                });
            }
        }
    }

    /// Wait out the current banner and expire it. A banner raised meanwhile
    /// has a newer generation and survives.
    pub async fn expire_error(&self) {
        let Some(banner) = self.with_state(|s| s.error().copied()) else {
            return;
        };
        sleep_until(banner.expires_at).await;
        self.dispatch(Action::ErrorExpired {
            generation: banner.generation,
        });
    }

    async fn send_update(&self, todo: Todo) {
        let id = todo.id;
        match self.api.update(&todo).await {
            Ok(updated) => {
                tracing::info!(id, "todo updated");
                self.dispatch(Action::UpdateSucceeded(updated));
            }
            Err(err) => {
                report(Failure::UpdateFailed, &err);
                self.dispatch(Action::UpdateFailed(id));
            }
        }
    }

    /// Mark an idle todo busy with `requested` and hand back its current
    /// value. Busy or unknown ids yield `None` and change nothing.
    fn claim(&self, id: TodoId, requested: fn(TodoId) -> Action) -> Option<Todo> {
        self.claim_if(id, requested, |_| true)
    }

    fn claim_if(
        &self,
        id: TodoId,
        requested: fn(TodoId) -> Action,
        wanted: impl FnOnce(&Todo) -> bool,
    ) -> Option<Todo> {
        let mut store = self.store();
        let state = store.state();
        if state.is_busy(id) {
            tracing::debug!(id, "ignoring action on busy todo");
            return None;
        }
        let todo = state.find(id).filter(|t| wanted(t)).cloned()?;
        store.dispatch(requested(id));
        Some(todo)
    }

    fn dispatch(&self, action: Action) {
        self.store().dispatch(action);
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn report(failure: Failure, err: &ApiError) {
    tracing::warn!(error = %err, "{failure}");
}

fn aggregate<R>(results: Vec<Result<R, ApiError>>, failure: Failure) -> Option<Failure> {
    let mut failed = false;
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        report(failure, err);
        failed = true;
    }
    failed.then_some(failure)
}
