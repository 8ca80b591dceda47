//! PostgreSQL-backed [`TodoStore`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use todo_core::{StoreError, Todo, TodoFields, TodoId, TodoStore, TodoTransaction};

use crate::config::DatabaseConfig;

/// Run in order, inside one transaction. Safe to repeat.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        description TEXT,
        completed BOOLEAN DEFAULT false
    )",
    // Tables created by the first schema still carry this column.
    "ALTER TABLE todos DROP COLUMN IF EXISTS title",
];

const INSERT_TODO: &str =
    "INSERT INTO todos (description, completed) VALUES ($1, $2) RETURNING id::BIGINT";
const SELECT_TODOS: &str = "SELECT id::BIGINT AS id, \
     COALESCE(description, '') AS description, \
     COALESCE(completed, false) AS completed \
     FROM todos ORDER BY id";
// Ids are bound as INT8; the cast to the column type makes an id that does
// not fit fail the statement instead of matching nothing.
const UPDATE_TODO: &str =
    "UPDATE todos SET description = $2, completed = $3 WHERE id = $1::INT4";
const DELETE_TODO: &str = "DELETE FROM todos WHERE id = $1::INT4";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build a pool without connecting. The first request that needs a
    /// connection opens one; until the database is reachable requests fail
    /// with an infrastructure error instead of the server refusing to start.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::from_str(&config.url)?;
        tracing::info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("<default>"),
            max_connections = config.max_connections,
            "configuring PostgreSQL pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }
        tx.commit().await.map_err(store_error)
    }

    async fn insert(&self, fields: TodoFields) -> Result<TodoId, StoreError> {
        sqlx::query_scalar::<_, i64>(INSERT_TODO)
            .bind(fields.description)
            .bind(fields.completed)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows: Vec<(i64, String, bool)> = sqlx::query_as(SELECT_TODOS)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, description, completed)| Todo {
                id,
                description,
                completed,
            })
            .collect())
    }

    async fn update(&self, id: TodoId, fields: TodoFields) -> Result<(), StoreError> {
        sqlx::query(UPDATE_TODO)
            .bind(id)
            .bind(fields.description)
            .bind(fields.completed)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        sqlx::query(DELETE_TODO)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn TodoTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(Box::new(PgTransaction { tx }))
    }
}

/// sqlx rolls the transaction back when it is dropped uncommitted.
struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TodoTransaction for PgTransaction {
    async fn delete(&mut self, id: TodoId) -> Result<(), StoreError> {
        sqlx::query(DELETE_TODO)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(store_error)
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}
