//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! The remote API speaks camelCase JSON (`userId`); serde renames keep the
//! Rust field names conventional. Integration tests catch any schema drift
//! between the two crates.

use serde::{Deserialize, Serialize};

/// Server-assigned todo identifier.
pub type TodoId = i64;

/// Owner identifier every request is scoped to.
pub type UserId = i64;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
}

impl Todo {
    /// Copy of this todo with `completed` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this todo carrying a new title.
    pub fn retitled(&self, title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..self.clone()
        }
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub user_id: UserId,
    #[serde(default)]
    pub completed: bool,
}
