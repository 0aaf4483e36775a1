use std::sync::Arc;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::trace::TraceLayer;

use crate::{
    config::defaults,
    middleware::{catch_panic_layer, json_error_middleware, response_cache_middleware},
    state::AppState,
};

pub mod forms;
pub mod user;

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit_bytes = state
        .config
        .storage
        .as_ref()
        .map(|storage| storage.upload_limit_bytes)
        .unwrap_or(defaults::DEFAULT_UPLOAD_LIMIT_BYTES as usize);

    Router::new()
        .nest("/user", user::router(upload_limit_bytes))
        .layer(from_fn_with_state(
            Arc::clone(&state),
            response_cache_middleware,
        ))
        .layer(from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
