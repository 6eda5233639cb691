use std::sync::Arc;

use anyhow::Context;
use ingest_server::config::AppConfig;
use ingest_server::state::{AppState, init_object_store};
use ingest_server::{build_router, database, seed};
use mq::{MqConfig, init_mq};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    info!("Database ready");

    let store = init_object_store(&config.storage)
        .await
        .context("Failed to initialize object store")?;
    info!(backend = ?config.storage.backend, "Object store ready");

    // Events are best-effort, so a broker outage must not keep the API down.
    let mq = if config.mq.enabled {
        match init_mq(MqConfig {
            url: config.mq.url.clone(),
            pool_size: config.mq.pool_size,
        })
        .await
        {
            Ok(mq) => {
                info!(queue = %config.mq.upload_event_queue, "MQ connected");
                Some(Arc::new(mq))
            }
            Err(e) => {
                warn!(error = %e, "MQ unavailable, upload events disabled");
                None
            }
        }
    } else {
        info!("MQ disabled, upload events will not be published");
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(config, db, store, mq));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
