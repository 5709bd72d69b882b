//! Todo list application core.
//!
//! # Overview
//! Fetches, filters and mutates one user's todo list against a remote REST
//! API, keeping the canonical list, the filtered view, the set of todos with
//! in-flight requests, and the error banner consistent after partial
//! failures.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces requests, `parse_*`
//!   consumes responses (host-does-IO). A host-supplied `Transport` executes
//!   them.
//! - `Store` is the single source of UI state; it only changes through
//!   `Action`s applied by a reducer.
//! - `TodoApp` is the controller: each operation dispatches a request action,
//!   awaits the network with the store unlocked, then dispatches the settle
//!   action. Operations take `&self` and may overlap.
//! - `view` renders the state as HTML with stable `data-cy` hooks.

pub mod app;
pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;

pub use app::TodoApp;
pub use client::TodoClient;
pub use error::{ApiError, Failure};
pub use filter::Filter;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{Action, AppState, ErrorBanner, Store, ERROR_DISPLAY};
pub use transport::{TodoApi, Transport};
pub use types::{NewTodo, Todo, TodoId, UserId};
