//! In-memory transactional store.
//!
//! Rows live in a `BTreeMap` behind a shared lock, so listing is ordered by
//! id for free. A transaction stages its deletions and applies them in one
//! critical section on commit; until then other callers see the rows
//! untouched. Faults can be switched on to drive the failure paths of the
//! service without a real database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::{TodoStore, TodoTransaction};
use crate::types::{Todo, TodoFields, TodoId};

/// Counters of transaction traffic seen by a [`MemoryStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: usize,
    pub committed: usize,
    /// Explicit rollbacks plus scopes dropped without commit.
    pub rolled_back: usize,
    /// Delete statements executed inside transactions, failed ones included.
    pub statements: usize,
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    fail_commit: bool,
    failing_deletes: BTreeSet<TodoId>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<TodoId, Todo>,
    last_id: TodoId,
    faults: Faults,
    stats: TransactionStats,
}

impl Inner {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.faults.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, fields: TodoFields) -> TodoId {
        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(id, fields.into_todo(id));
        id
    }
}

/// Cheaply cloneable handle; clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing fault injection. Returns their ids.
    pub fn seed<I>(&self, rows: I) -> Vec<TodoId>
    where
        I: IntoIterator<Item = TodoFields>,
    {
        let mut inner = self.inner.lock();
        rows.into_iter().map(|fields| inner.insert(fields)).collect()
    }

    pub fn get(&self, id: TodoId) -> Option<Todo> {
        self.inner.lock().rows.get(&id).cloned()
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.inner.lock().rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TransactionStats {
        self.inner.lock().stats
    }

    /// Make every call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().faults.unavailable = unavailable;
    }

    /// Make every subsequent commit fail.
    pub fn set_fail_commit(&self, fail: bool) {
        self.inner.lock().faults.fail_commit = fail;
    }

    /// Make transactional deletes of `id` fail.
    pub fn fail_delete_of(&self, id: TodoId) {
        self.inner.lock().faults.failing_deletes.insert(id);
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        self.inner.lock().check_available()
    }

    async fn insert(&self, fields: TodoFields) -> Result<TodoId, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_available()?;
        Ok(inner.insert(fields))
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.lock();
        inner.check_available()?;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn update(&self, id: TodoId, fields: TodoFields) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.check_available()?;
        if let Some(row) = inner.rows.get_mut(&id) {
            row.description = fields.description;
            row.completed = fields.completed;
        }
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.check_available()?;
        inner.rows.remove(&id);
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn TodoTransaction>, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_available()?;
        inner.stats.begun += 1;
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            pending: Vec::new(),
            finished: false,
        }))
    }
}

struct MemoryTransaction {
    inner: Arc<Mutex<Inner>>,
    pending: Vec<TodoId>,
    finished: bool,
}

#[async_trait]
impl TodoTransaction for MemoryTransaction {
    async fn delete(&mut self, id: TodoId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.stats.statements += 1;
        inner.check_available()?;
        if inner.faults.failing_deletes.contains(&id) {
            return Err(StoreError::Backend(format!(
                "could not delete row {id}: injected fault"
            )));
        }
        self.pending.push(id);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock();
            inner.check_available()?;
            if inner.faults.fail_commit {
                return Err(StoreError::Backend(
                    "could not serialize access due to concurrent update".to_string(),
                ));
            }
            for id in &self.pending {
                inner.rows.remove(id);
            }
            inner.stats.committed += 1;
        }
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.pending.clear();
        self.finished = true;
        self.inner.lock().stats.rolled_back += 1;
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.inner.lock().stats.rolled_back += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(n: usize) -> (MemoryStore, Vec<TodoId>) {
        let store = MemoryStore::new();
        let ids = store.seed((0..n).map(|i| TodoFields::new(format!("todo {i}"), false)));
        (store, ids)
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(TodoFields::new("a", false)).await.unwrap();
        let b = store.insert(TodoFields::new("b", true)).await.unwrap();
        assert_eq!((a, b), (1, 2));

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].description, "b");
        assert!(rows[1].completed);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let (store, ids) = seeded(2);
        store.delete(ids[1]).await.unwrap();
        let next = store.insert(TodoFields::default()).await.unwrap();
        assert_eq!(next, 3);
    }

    #[tokio::test]
    async fn update_missing_row_is_a_no_op() {
        let store = MemoryStore::new();
        store.update(42, TodoFields::new("x", true)).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn staged_deletes_are_invisible_until_commit() {
        let (store, ids) = seeded(3);
        let mut tx = store.begin().await.unwrap();
        tx.delete(ids[0]).await.unwrap();
        tx.delete(ids[2]).await.unwrap();
        assert_eq!(store.len(), 3);

        tx.commit().await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(ids[1]));

        let stats = store.stats();
        assert_eq!(stats.begun, 1);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.statements, 2);
    }

    #[tokio::test]
    async fn dropping_a_transaction_rolls_it_back() {
        let (store, ids) = seeded(2);
        {
            let mut tx = store.begin().await.unwrap();
            tx.delete(ids[0]).await.unwrap();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().rolled_back, 1);
        assert_eq!(store.stats().committed, 0);
    }

    #[tokio::test]
    async fn explicit_rollback_is_counted_once() {
        let (store, ids) = seeded(1);
        let mut tx = store.begin().await.unwrap();
        tx.delete(ids[0]).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(store.contains(ids[0]));
        assert_eq!(store.stats().rolled_back, 1);
    }

    #[tokio::test]
    async fn failed_commit_applies_nothing() {
        let (store, ids) = seeded(2);
        store.set_fail_commit(true);
        let mut tx = store.begin().await.unwrap();
        tx.delete(ids[0]).await.unwrap();
        assert!(tx.commit().await.is_err());
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().rolled_back, 1);
    }

    #[tokio::test]
    async fn unavailable_store_refuses_everything() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.begin().await, Err(StoreError::Unavailable(_))));
        assert!(store.list().await.is_err());
        assert!(store.migrate().await.is_err());
        assert_eq!(store.stats().begun, 0);
    }

    #[tokio::test]
    async fn injected_delete_fault_targets_one_id() {
        let (store, ids) = seeded(2);
        store.fail_delete_of(ids[1]);
        let mut tx = store.begin().await.unwrap();
        assert!(tx.delete(ids[0]).await.is_ok());
        assert!(matches!(tx.delete(ids[1]).await, Err(StoreError::Backend(_))));
    }
}
