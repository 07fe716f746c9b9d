pub mod error;
pub mod handlers;
pub mod types;

use crate::server::handlers::{compress_image_handler, server_status_handler};
use crate::server::types::AppState;
use crate::utils::constants::{COMPRESS_ROUTE, MULTIPART_OVERHEAD_BYTES, UPLOADS_ROUTE};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // the image limit is enforced per field in the handler, this bounds the whole
    // body and surfaces through the multipart reader as a JSON 413
    let request_body_limit = DefaultBodyLimit::max(
        state
            .max_image_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
    );

    let mut router = Router::new()
        .route("/", get(server_status_handler))
        .route(COMPRESS_ROUTE, post(compress_image_handler));

    if let Some(dir) = state.store.local_dir() {
        router = router.nest_service(UPLOADS_ROUTE, ServeDir::new(dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(request_body_limit)
                .layer(cors)
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}
