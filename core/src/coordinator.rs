//! All-or-nothing deletion of a caller-supplied set of todos.
//!
//! # Design
//! One transaction per call. Identifiers are deleted in input order and
//! recorded as each statement succeeds; the first failure abandons the whole
//! batch. The scope is handed to `commit` or `rollback` on every path, and
//! the store guarantees a dropped scope is rolled back, so a cancelled
//! request cannot leak an open transaction either.
//!
//! Identifiers that match no row are not errors: the datastore's
//! delete-by-primary-key affects zero rows and the id is still reported as
//! processed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::store::{TodoStore, TodoTransaction};
use crate::types::{DeletionResult, TodoId};

#[derive(Clone)]
pub struct BulkDeleteCoordinator {
    store: Arc<dyn TodoStore>,
}

impl BulkDeleteCoordinator {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Delete every id in `ids` inside a single transaction.
    ///
    /// On success the result lists exactly `ids`, in order. On error nothing
    /// was removed and the error is `Infrastructure`.
    pub async fn delete_many(&self, ids: &[TodoId]) -> Result<DeletionResult, ServiceError> {
        let mut tx = self.store.begin().await.map_err(|e| {
            ServiceError::infrastructure(format!("failed to start transaction: {e}"))
        })?;

        let mut deleted = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Err(e) = tx.delete(id).await {
                let err = ServiceError::infrastructure(format!(
                    "failed to delete record with ID {id}: {e}"
                ));
                abandon(tx, deleted.len()).await;
                return Err(err);
            }
            debug!(id, "row deleted inside transaction");
            deleted.push(id);
        }

        tx.commit().await.map_err(|e| {
            ServiceError::infrastructure(format!("failed to commit transaction: {e}"))
        })?;

        info!(count = deleted.len(), "bulk delete committed");
        Ok(DeletionResult::succeeded(deleted))
    }
}

async fn abandon(tx: Box<dyn TodoTransaction>, executed: usize) {
    match tx.rollback().await {
        Ok(()) => debug!(executed, "bulk delete rolled back"),
        // The scope is gone either way; the store discards it on drop.
        Err(e) => warn!(executed, error = %e, "rollback failed"),
    }
}
