//! Error types for the todo client.
//!
//! # Design
//! Two layers. `ApiError` is what the client and transport report: `NotFound`
//! gets a dedicated variant, every other unexpected status lands in
//! `HttpError` with the raw status and body. `Failure` is the user-facing
//! taxonomy the controller turns every `ApiError` into; each variant renders
//! exactly one fixed banner message.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404, the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// User-facing failure shown in the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("Unable to load todos")]
    LoadFailed,

    #[error("Title should not be empty")]
    EmptyTitle,

    #[error("Unable to add a todo")]
    AddFailed,

    #[error("Unable to update a todo")]
    UpdateFailed,

    /// Bulk toggle keeps its own wording.
    #[error("Unable to update todo")]
    ToggleAllFailed,

    #[error("Unable to delete a todo")]
    DeleteFailed,
}

impl Failure {
    pub fn message(self) -> String {
        self.to_string()
    }
}
