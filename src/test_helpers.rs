use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

use crate::{
    auth::JwtKeys,
    config::AppConfig,
    routes::router,
    state::AppState,
    storage::MemoryObjectStore,
};

pub const TEST_SECRET: &[u8] = b"test-secret";

/// State over a caller-seeded mock connection. The cache allow-list is
/// configurable so middleware tests can opt in; everything else uses
/// defaults.
pub fn test_state(db: DatabaseConnection, cache_paths: &[&str]) -> Arc<AppState> {
    let mut cfg = AppConfig::default();
    cfg.cache.paths = cache_paths.iter().map(|p| p.to_string()).collect();

    AppState::new(
        cfg,
        db,
        JwtKeys::from_secret(TEST_SECRET),
        Arc::new(MemoryObjectStore::new("https://files.test/")),
    )
}

pub fn test_router(db: DatabaseConnection, cache_paths: &[&str]) -> Router {
    router(test_state(db, cache_paths))
}
