//! HTTP front of the todo service.
//!
//! # Design
//! The router is built over an injected `Arc<dyn TodoStore>`: `main` passes
//! the Postgres store, tests pass a `MemoryStore`. Every route goes through
//! the CORS middleware and is traced by `tower_http`. Unmatched paths fall
//! through to the hello handler.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use todo_core::{BulkDeleteCoordinator, TodoStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod cors;
pub mod error;
pub mod form;
pub mod handlers;
pub mod logging;
pub mod postgres;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub bulk_delete: BulkDeleteCoordinator,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            bulk_delete: BulkDeleteCoordinator::new(Arc::clone(&store)),
            store,
        }
    }
}

pub fn app(store: Arc<dyn TodoStore>) -> Router {
    Router::new()
        .route("/", get(handlers::hello))
        .route("/setup", get(handlers::setup).post(handlers::setup))
        .route("/insert", post(handlers::insert))
        .route("/select-all", get(handlers::select_all))
        .route(
            "/update/",
            post(handlers::update_without_id).put(handlers::update_without_id),
        )
        .route(
            "/update/{*id}",
            post(handlers::update).put(handlers::update),
        )
        .route("/delete", post(handlers::delete).delete(handlers::delete))
        .route("/bulk-delete", post(handlers::bulk_delete))
        .fallback(handlers::hello)
        .layer(middleware::from_fn(cors::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store))
}

pub async fn run(listener: TcpListener, store: Arc<dyn TodoStore>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}
