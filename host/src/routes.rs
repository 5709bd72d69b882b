//! Server-rendered UI: every form post or link maps onto one `TodoApp`
//! operation, then redirects back to the page.
//!
//! # Design
//! Handlers share one `TodoApp` and call it concurrently; the controller only
//! locks its store between awaits, so a page rendered while a request is in
//! flight shows that todo as busy. Whenever an action leaves an error banner
//! up, a task waits out its deadline and expires it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tokio::time::sleep_until;
use tower_http::trace::TraceLayer;

use todo_core::{view, Filter, TodoApp, TodoId, Transport};

pub type SharedApp<T> = Arc<TodoApp<T>>;

#[derive(Debug, Deserialize)]
pub struct TitleForm {
    #[serde(default)]
    pub title: String,
}

/// Build the UI router. Without an app (no owner configured) every path
/// serves the user warning screen.
pub fn router<T>(app: Option<SharedApp<T>>) -> Router
where
    T: Transport + 'static,
{
    let Some(app) = app else {
        return Router::new()
            .fallback(user_warning)
            .layer(TraceLayer::new_for_http());
    };

    Router::new()
        .route("/", get(index::<T>))
        .route("/todos", post(add::<T>))
        .route("/todos/toggle-all", post(toggle_all::<T>))
        .route("/todos/{id}/toggle", post(toggle::<T>))
        .route("/todos/{id}/edit", post(start_edit::<T>))
        .route("/todos/{id}/title", post(submit_title::<T>))
        .route("/todos/{id}/cancel", post(cancel_edit::<T>))
        .route("/todos/{id}/delete", post(delete::<T>))
        .route("/filter/{name}", get(select_filter::<T>))
        .route("/clear-completed", post(clear_completed::<T>))
        .route("/error/dismiss", post(dismiss_error::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Expire the current error banner once its deadline passes.
pub async fn watch_error<T>(app: &SharedApp<T>)
where
    T: Transport + 'static,
{
    let Some(deadline) = app.with_state(|s| s.error().map(|e| e.expires_at)) else {
        return;
    };
    let app = Arc::clone(app);
    tokio::spawn(async move {
        sleep_until(deadline).await;
        app.tick();
    });
}

async fn user_warning() -> Html<String> {
    Html(view::render_user_warning())
}

async fn index<T: Transport + 'static>(State(app): State<SharedApp<T>>) -> Html<String> {
    app.tick();
    Html(app.with_state(view::render_page))
}

async fn add<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Form(form): Form<TitleForm>,
) -> Redirect {
    app.add_titled(form.title).await;
    settled(&app).await
}

async fn toggle_all<T: Transport + 'static>(State(app): State<SharedApp<T>>) -> Redirect {
    app.toggle_all().await;
    settled(&app).await
}

async fn toggle<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(id): Path<TodoId>,
) -> Redirect {
    app.toggle(id).await;
    settled(&app).await
}

async fn start_edit<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(id): Path<TodoId>,
) -> Redirect {
    app.start_edit(id);
    Redirect::to("/")
}

async fn submit_title<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(id): Path<TodoId>,
    Form(form): Form<TitleForm>,
) -> Redirect {
    if editing(&app, id) {
        app.edit_draft(form.title);
        app.submit_edit().await;
    }
    settled(&app).await
}

async fn cancel_edit<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(id): Path<TodoId>,
) -> Redirect {
    if editing(&app, id) {
        app.cancel_edit();
    }
    Redirect::to("/")
}

async fn delete<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(id): Path<TodoId>,
) -> Redirect {
    app.delete(id).await;
    settled(&app).await
}

async fn select_filter<T: Transport + 'static>(
    State(app): State<SharedApp<T>>,
    Path(name): Path<String>,
) -> Response {
    match name.parse::<Filter>() {
        Ok(filter) => {
            app.select_filter(filter);
            Redirect::to("/").into_response()
        }
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

async fn clear_completed<T: Transport + 'static>(State(app): State<SharedApp<T>>) -> Redirect {
    app.clear_completed().await;
    settled(&app).await
}

async fn dismiss_error<T: Transport + 'static>(State(app): State<SharedApp<T>>) -> Redirect {
    app.dismiss_error();
    Redirect::to("/")
}

fn editing<T: Transport>(app: &TodoApp<T>, id: TodoId) -> bool {
    app.with_state(|s| s.inline_edit().is_some_and(|edit| edit.id == id))
}

async fn settled<T: Transport + 'static>(app: &SharedApp<T>) -> Redirect {
    watch_error(app).await;
    Redirect::to("/")
}
