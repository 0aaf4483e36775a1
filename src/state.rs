use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::JwtKeys,
    cache::ResponseCache,
    config::AppConfig,
    storage::ObjectStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    // Shared handle; DatabaseConnection is not cloneable with the mock
    // backend compiled in.
    pub db: Arc<DatabaseConnection>,
    pub jwt: JwtKeys,
    pub cache: Arc<ResponseCache>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        jwt: JwtKeys,
        store: Arc<dyn ObjectStore>,
    ) -> Arc<Self> {
        let cache = Arc::new(ResponseCache::new(&config.cache));
        Arc::new(Self {
            config,
            db: Arc::new(db),
            jwt,
            cache,
            store,
        })
    }
}
