//! Error types for the todo service.
//!
//! # Design
//! Two layers. `StoreError` is what a datastore reports for a single call.
//! `ServiceError` is what an operation reports to its caller: a kind that the
//! HTTP layer maps to a status code, plus the already-rendered message. The
//! core never decides on status codes itself.

use thiserror::Error;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be decoded or coerced; the datastore was not touched.
    ClientInput,

    /// The datastore was unreachable or a statement, begin or commit failed.
    Infrastructure,
}

/// Failure of a single datastore call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be obtained.
    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    /// The datastore rejected or failed the statement.
    #[error("{0}")]
    Backend(String),
}

/// Failure of a service operation, carried to the boundary layer.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
}

impl ServiceError {
    pub fn client_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ClientInput,
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Infrastructure,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
