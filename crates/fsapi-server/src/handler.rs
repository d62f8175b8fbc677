use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServerResult;
use crate::state::AppState;

/// The `?path=` query parameter shared by every file endpoint.
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage_configured: bool,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        storage_configured: state.storage.has_blob_store(),
    })
}

// ---- /storage/files ----

pub async fn list_objects(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<Json<Vec<String>>> {
    Ok(Json(state.storage.list(&q.path).await?))
}

pub async fn put_object(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
    body: Bytes,
) -> ServerResult<StatusCode> {
    state.storage.put(&q.path, body).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_object(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<impl IntoResponse> {
    let data = state.storage.get(&q.path).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}

pub async fn delete_objects(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<StatusCode> {
    let report = state.storage.delete_by_prefix(&q.path).await?;
    if !report.is_clean() {
        warn!(
            path = %q.path,
            removed = report.removed.len(),
            failed = report.failures.len(),
            "delete finished with failures"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- /files ----

pub async fn list_files(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<Json<Vec<String>>> {
    Ok(Json(state.inline.list(&q.path).await?))
}

pub async fn put_file(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
    body: String,
) -> ServerResult<StatusCode> {
    state.inline.put(&q.path, &body).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_file(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<String> {
    Ok(state.inline.get(&q.path).await?)
}

pub async fn delete_files(
    State(state): State<AppState>,
    Query(q): Query<PathQuery>,
) -> ServerResult<StatusCode> {
    state.inline.delete_by_prefix(&q.path).await?;
    Ok(StatusCode::NO_CONTENT)
}
