//! Datastore-agnostic core of the todo service.
//!
//! # Overview
//! Holds the domain types, the error taxonomy, the [`TodoStore`] capability
//! the HTTP layer is built against, and the [`BulkDeleteCoordinator`] that
//! removes a set of todos atomically.
//!
//! # Design
//! - No network I/O here. The server crate supplies a Postgres-backed store;
//!   [`MemoryStore`] is a transactional stand-in for tests.
//! - Operations return [`ServiceError`], whose [`ErrorKind`] lets the
//!   boundary pick a status code while the core stays presentation-agnostic.

pub mod coordinator;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use coordinator::BulkDeleteCoordinator;
pub use error::{ErrorKind, ServiceError, StoreError};
pub use memory::{MemoryStore, TransactionStats};
pub use store::{TodoStore, TodoTransaction};
pub use types::{DeletionRequest, DeletionResult, Todo, TodoFields, TodoId};
