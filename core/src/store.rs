//! Datastore capability consumed by the service.
//!
//! # Design
//! Handlers and the bulk-delete coordinator never open connections
//! themselves; they receive an `Arc<dyn TodoStore>`. Production wires in the
//! Postgres store from the server crate, tests wire in
//! [`MemoryStore`](crate::memory::MemoryStore).
//!
//! A [`TodoTransaction`] is a scope: its effects become visible only through
//! `commit`. Dropping it without calling `commit` must discard everything it
//! did, so an early return or a cancelled request can never leave partial
//! state behind.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Todo, TodoFields, TodoId};

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Create the `todos` table if needed and bring it to the current shape.
    async fn migrate(&self) -> Result<(), StoreError>;

    /// Insert a row and return its new identifier.
    async fn insert(&self, fields: TodoFields) -> Result<TodoId, StoreError>;

    /// All rows ordered by identifier.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// Overwrite both mutable columns. Updating a missing row is not an error.
    async fn update(&self, id: TodoId, fields: TodoFields) -> Result<(), StoreError>;

    /// Delete one row. Deleting a missing row is not an error.
    async fn delete(&self, id: TodoId) -> Result<(), StoreError>;

    /// Open a transactional scope.
    async fn begin(&self) -> Result<Box<dyn TodoTransaction>, StoreError>;
}

#[async_trait]
pub trait TodoTransaction: Send {
    /// Delete one row inside the scope. A missing row affects nothing.
    async fn delete(&mut self, id: TodoId) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
