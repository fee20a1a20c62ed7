use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use listsync_core::{
    create_sync_queue, load_config, validate_config, ActiveCampaignClient, ConfigProvider,
    ContactService, LogStore, OrderSource, SharedSyncConfig, SqliteLogStore, SqliteOrderStore,
    SyncLogger, SyncMarkerStore, SyncOrchestrator, SyncTrigger,
};
use listsync_server::api::create_router;
use listsync_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LISTSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    let missing = config.sync.missing_fields();
    if !missing.is_empty() {
        info!(
            "Sync settings incomplete ({}); orders will not sync until they are set",
            missing.join(", ")
        );
    }

    // Live sync settings, editable through the admin API
    let sync_config = SharedSyncConfig::new(config.sync.clone());

    // Create SQLite order store (billing fields + sync marker)
    let orders = Arc::new(
        SqliteOrderStore::new(&config.database.path).context("Failed to create order store")?,
    );
    info!("Order store initialized");

    // Create SQLite sync log
    let log_store: Arc<dyn LogStore> = Arc::new(
        SqliteLogStore::new(&config.database.path).context("Failed to create sync log store")?,
    );
    let logger = SyncLogger::new(
        log_store,
        Arc::new(sync_config.clone()) as Arc<dyn ConfigProvider>,
    );
    info!("Sync log initialized");

    // Create contact service client
    let contact_service: Arc<dyn ContactService> = Arc::new(
        ActiveCampaignClient::new(&config.contact_service)
            .context("Failed to create contact service client")?,
    );
    info!(
        "Contact service client ready (timeout {}s, subscribe timeout {}s)",
        config.contact_service.request_timeout_secs, config.contact_service.subscribe_timeout_secs
    );

    // Create orchestrator and the deferred sync queue
    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::new(sync_config.clone()),
        Arc::clone(&contact_service),
        Arc::clone(&orders) as Arc<dyn OrderSource>,
        Arc::clone(&orders) as Arc<dyn SyncMarkerStore>,
        logger.clone(),
    ));
    let (queue, worker) = create_sync_queue(orchestrator, config.queue.buffer_size);

    // Spawn sync worker task
    let worker_handle = tokio::spawn(worker.run());

    let trigger = SyncTrigger::new(
        Arc::clone(&orders) as Arc<dyn SyncMarkerStore>,
        queue,
        logger.clone(),
    );

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        sync_config,
        contact_service,
        orders,
        logger,
        trigger,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped, draining sync queue");

    // The router (and with it the last queue handle) is gone once serve
    // returns, so the worker finishes buffered jobs and exits.
    let _ = worker_handle.await;

    info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
