use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use newsdesk::{
    config::Config,
    db::{self, PgStore},
    middleware::RequestLogSink,
    routes::create_router,
    storage::S3ObjectStore,
    submission::NewsSubmitter,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database
    let pool = db::create_pool(&config.database, config.upstream_timeout()).await?;

    // Run migrations
    info!("Running database migrations...");
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    // Clients are built once here and shared through AppState
    let store = Arc::new(PgStore::new(pool, config.upstream_timeout()));
    let objects = Arc::new(S3ObjectStore::new(&config.storage, config.upstream_timeout())?);
    let (request_log, log_writer) =
        RequestLogSink::spawn(store.clone(), config.request_log.queue_capacity);

    let state = newsdesk::AppState {
        submitter: NewsSubmitter::new(store.clone(), objects, config.storage.cdn_url.clone()),
        logs: store,
        request_log: request_log.clone(),
        max_upload_bytes: config.server.max_upload_bytes,
    };

    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    let stats = request_log.stats();
    info!(
        written = stats.written,
        failed = stats.failed,
        dropped = stats.dropped,
        "Request log totals at shutdown"
    );

    // The router's sink clones are gone; dropping the last one lets the
    // writer drain what is still queued and exit.
    drop(request_log);
    if let Err(e) = log_writer.await {
        warn!("Request log writer ended abnormally: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
