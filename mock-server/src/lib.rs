use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub user_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub user_id: i64,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update. Clients may send the whole todo; `id` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub user_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<i64>,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(
        store
            .todos
            .values()
            .filter(|t| query.user_id.is_none_or(|owner| t.user_id == owner))
            .cloned()
            .collect(),
    )
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let todo = Todo {
        id: store.next_id,
        title: input.title,
        completed: input.completed,
        user_id: input.user_id,
    };
    store.todos.insert(todo.id, todo.clone());
    tracing::debug!(id = todo.id, user_id = todo.user_id, "todo created");
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    if let Some(user_id) = input.user_id {
        todo.user_id = user_id;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_owner_as_camel_case() {
        let todo = Todo {
            id: 4,
            title: "Test".to_string(),
            completed: false,
            user_id: 9,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
        assert_eq!(json["userId"], 9);
    }

    #[test]
    fn create_todo_defaults_completed_to_false() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"title":"No completed field","userId":1}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
    }

    #[test]
    fn create_todo_rejects_missing_owner() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_todo_accepts_whole_todo() {
        let input: UpdateTodo = serde_json::from_str(
            r#"{"id":3,"title":"New title","completed":true,"userId":1}"#,
        )
        .unwrap();
        assert_eq!(input.title.as_deref(), Some("New title"));
        assert_eq!(input.completed, Some(true));
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.completed.is_none());
        assert!(input.user_id.is_none());
    }
}
