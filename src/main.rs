use std::{net::SocketAddr, sync::Arc};

use account_server::{
    auth::JwtKeys,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    routes::router,
    state::AppState,
    storage::{HttpObjectStore, MemoryObjectStore, ObjectStore},
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging);

    let database = cfg
        .database
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("database configuration is required"))?;
    let db = connection::connect(database).await?;

    let auth = cfg
        .auth
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("auth configuration is required"))?;
    let jwt = JwtKeys::from_secret_file(&auth.jwt_secret_file)?;

    let store: Arc<dyn ObjectStore> = match cfg.storage.as_ref() {
        Some(storage) => Arc::new(HttpObjectStore::new(storage)),
        None => {
            tracing::warn!("no storage configured, uploads stay in memory");
            Arc::new(MemoryObjectStore::new("/"))
        }
    };

    let state = AppState::new(cfg, db, jwt, store);
    let app = router(Arc::clone(&state));

    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.general.host, state.config.general.port
    )
    .parse()?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
