//! HTTP surface.
//!
//! JSON over axum. Errors are returned as `{ "code", "message" }` bodies;
//! see [`error::ApiErrorResponse`] for the status code mapping.

pub mod dto;
pub mod error;
pub mod state;
pub mod tasks;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiErrorResponse};
pub use state::AppState;

/// `GET /health`
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth", post(users::register))
        .route("/auth/login", post(users::login))
        .route("/users", get(users::list_users))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/tasks/{id}/labels",
            post(tasks::add_labels).delete(tasks::remove_labels),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
