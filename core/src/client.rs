//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and the owning `user_id` and carries
//! no mutable state between calls. Each CRUD operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller executes the actual HTTP round-trip,
//! keeping the core deterministic and free of I/O dependencies.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, TodoId, UserId};

/// Synchronous, stateless client for the todo API, scoped to one owner.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    user_id: UserId,
}

impl TodoClient {
    pub fn new(base_url: &str, user_id: UserId) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos?userId={}", self.base_url, self.user_id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, title: &str) -> Result<HttpRequest, ApiError> {
        let input = NewTodo {
            title: title.to_string(),
            user_id: self.user_id,
            completed: false,
        };
        let body = serde_json::to_string(&input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// The whole todo is sent; the server applies every field it carries.
    pub fn build_update_todo(&self, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(todo).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/todos/{}", self.base_url, todo.id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, &[200])?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200, 201])?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])?;
        Ok(())
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000", 42)
    }

    fn todo() -> Todo {
        Todo {
            id: 5,
            title: "Buy milk".to_string(),
            completed: true,
            user_id: 42,
        }
    }

    #[test]
    fn build_list_todos_is_scoped_to_user() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos?userId=42");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_sends_owner_and_incomplete_flag() {
        let req = client().build_create_todo("Buy milk").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["userId"], 42);
        assert_eq!(body["completed"], false);
    }

    #[test]
    fn build_update_todo_patches_whole_todo() {
        let req = client().build_update_todo(&todo()).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:3000/todos/5");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["completed"], true);
        assert_eq!(body["userId"], 42);
    }

    #[test]
    fn build_delete_todo_has_no_body() {
        let req = client().build_delete_todo(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/todos/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":1,"title":"Test","completed":false,"userId":42}]"#,
        );
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
        assert_eq!(todos[0].user_id, 42);
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_todo_wrong_status() {
        let err = client()
            .parse_create_todo(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_update_todo_success() {
        let response = HttpResponse::new(
            200,
            r#"{"id":5,"title":"Updated","completed":true,"userId":42}"#,
        );
        let todo = client().parse_update_todo(response).unwrap();
        assert_eq!(todo.title, "Updated");
        assert!(todo.completed);
    }

    #[test]
    fn parse_delete_todo_accepts_ok_and_no_content() {
        assert!(client().parse_delete_todo(HttpResponse::new(204, "")).is_ok());
        assert!(client().parse_delete_todo(HttpResponse::new(200, "1")).is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client()
            .parse_delete_todo(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/", 1);
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/todos?userId=1");
    }
}
