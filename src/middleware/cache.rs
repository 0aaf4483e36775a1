use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// GET responses for allow-listed paths are replayed from the cache for
/// the configured TTL; any non-GET request clears the whole cache before
/// it runs. Only the body is replayed; a hit is always a 200 with a
/// JSON content type.
pub async fn response_cache_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        state.cache.clear();
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    let key = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let cacheable = state.cache.is_cacheable(&path);
    if cacheable {
        if let Some(body) = state.cache.get(&key) {
            return replay(body);
        }
    }

    let response = next.run(req).await;
    if !cacheable || !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to buffer cacheable response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // An empty payload is never cached; the client gets an empty array.
    if bytes.is_empty() {
        return replay(axum::body::Bytes::from_static(b"[]"));
    }

    state.cache.put(key, bytes.clone());
    Response::from_parts(parts, Body::from(bytes))
}

fn replay(body: axum::body::Bytes) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
