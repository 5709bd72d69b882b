//! The I/O seam between the client core and the host.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and hands back the raw
//! `HttpResponse`; status interpretation stays with `TodoClient`. `TodoApi`
//! pairs the two so the controller sees four async CRUD calls. Every call is
//! a single round-trip with no retry; fan-out is left to the caller.

use std::future::Future;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Todo, TodoId};

/// Executes HTTP requests on behalf of the core.
///
/// Implementations return non-2xx responses as data; only a request that
/// never produced a response is an `Err`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Async CRUD facade over a `TodoClient` and a `Transport`.
#[derive(Debug, Clone)]
pub struct TodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn create(&self, title: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(title)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn update(&self, todo: &Todo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(todo)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}
