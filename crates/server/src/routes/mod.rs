//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Liveness and Prometheus metrics
//! - `upload`: Authenticated document upload and analysis fan-out
//! - `auth`: Dev-mode token issuance
//! - `payments`: Payment reference creation
//! - `events`: Server-sent heartbeat stream

pub mod auth;
pub mod events;
pub mod health;
pub mod payments;
pub mod upload;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Landing page
///
/// Serves `<static_dir>/index.html` when it exists, otherwise a JSON
/// banner so API-only deployments still answer on `/`.
pub async fn landing(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let index_path = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Ok(Html(html).into_response()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Json(json!({
            "message": "Multi-Agent Interface is up and running!"
        }))
        .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
