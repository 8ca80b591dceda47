//! HTTP handlers.
//!
//! Everything except `bulk_delete` is a straight line: coerce the input,
//! run one statement, format the reply.

use axum::extract::{Path, State};
use axum::Json;
use bytes::Bytes;
use todo_core::{DeletionRequest, DeletionResult, ServiceError, StoreError, Todo, TodoFields, TodoId};

use crate::error::{ApiError, ApiResult};
use crate::form::{parse_bool, FormFields};
use crate::AppState;

pub async fn hello() -> &'static str {
    "Hello, World!"
}

pub async fn setup(State(state): State<AppState>) -> ApiResult<&'static str> {
    state
        .store
        .migrate()
        .await
        .map_err(|e| infrastructure("failed to run migration", e))?;
    tracing::info!("todos table migrated");
    Ok("Migration successful! The 'todos' table is created.")
}

pub async fn insert(State(state): State<AppState>, form: FormFields) -> ApiResult<String> {
    let fields = TodoFields::new(form.value("description"), form.value("completed") == "true");
    let id = state
        .store
        .insert(fields)
        .await
        .map_err(|e| infrastructure("failed to insert record", e))?;
    tracing::info!(id, "todo inserted");
    Ok(format!("Inserted record with ID: {id}"))
}

pub async fn select_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state
        .store
        .list()
        .await
        .map_err(|e| infrastructure("failed to execute query", e))?;
    Ok(Json(todos))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    form: FormFields,
) -> ApiResult<&'static str> {
    let id = parse_id(&raw_id)?;
    let completed = parse_bool(form.value("completed"))
        .ok_or_else(|| ApiError::bad_request("Invalid completed value"))?;
    let fields = TodoFields::new(form.value("description"), completed);
    state
        .store
        .update(id, fields)
        .await
        .map_err(|e| infrastructure("failed to update record", e))?;
    tracing::info!(id, "todo updated");
    Ok("Updated record successfully!")
}

/// `/update/` with nothing after the slash.
pub async fn update_without_id() -> ApiError {
    ApiError::bad_request("Todo ID is missing")
}

pub async fn delete(State(state): State<AppState>, form: FormFields) -> ApiResult<&'static str> {
    let id = parse_id(form.value("id"))?;
    state
        .store
        .delete(id)
        .await
        .map_err(|e| infrastructure("failed to delete record", e))?;
    tracing::info!(id, "todo deleted");
    Ok("Deleted record successfully!")
}

/// The body is decoded before the store is touched, whatever its content type.
pub async fn bulk_delete(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DeletionResult>> {
    let request = DeletionRequest::from_json(&body)?;
    tracing::debug!(ids = ?request.ids, "bulk delete requested");
    let result = state.bulk_delete.delete_many(&request.ids).await?;
    Ok(Json(result))
}

fn parse_id(raw: &str) -> ApiResult<TodoId> {
    if raw.is_empty() {
        return Err(ApiError::bad_request("Todo ID is missing"));
    }
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid Todo ID"))
}

fn infrastructure(context: &str, err: StoreError) -> ServiceError {
    ServiceError::infrastructure(format!("{context}: {err}"))
}
