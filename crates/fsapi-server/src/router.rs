use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

pub mod endpoints {
    pub const HEALTH: &str = "/v1/health";
    pub const STORAGE_FILES: &str = "/storage/files";
    pub const STORAGE_OBJECT: &str = "/storage/files/object";
    pub const FILES: &str = "/files";
    pub const FILE_OBJECT: &str = "/files/object";
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(
            endpoints::STORAGE_FILES,
            get(handler::list_objects).delete(handler::delete_objects),
        )
        .route(
            endpoints::STORAGE_OBJECT,
            get(handler::get_object).put(handler::put_object),
        )
        .route(
            endpoints::FILES,
            get(handler::list_files).delete(handler::delete_files),
        )
        .route(
            endpoints::FILE_OBJECT,
            get(handler::get_file).put(handler::put_file),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
