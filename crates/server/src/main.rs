mod api;
mod console;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use buildsync_core::{
    load_config, validate_config, ArchiveStager, BuildSource, BuildSyncScheduler,
    CloudBuildClient, FileStateStore, JsonDirTargets, Notifier, Publisher, ScriptPublisher,
    StagerConfig, Stager, StateStore, SyncOrchestrator, TargetSource, WebhookNotifier,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

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

    info!("buildsync {}", VERSION);

    // Determine config path
    let config_path = std::env::var("BUILDSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("buildsync.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Targets directory: {:?}", config.paths.targets_dir);
    info!("Publishing tool: {:?}", config.publisher.executable_path());
    if config.notifier.default_webhook_url.is_none() {
        info!("No default webhook configured");
    }

    for dir in [&config.paths.download_dir, &config.paths.state_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;
    }
    if !config.paths.targets_dir.is_dir() {
        warn!(
            "Targets directory {:?} does not exist yet; passes will fail until it is created",
            config.paths.targets_dir
        );
    }

    // Create pipeline components
    let targets: Arc<dyn TargetSource> =
        Arc::new(JsonDirTargets::new(config.paths.targets_dir.clone()));
    let builds: Arc<dyn BuildSource> = Arc::new(
        CloudBuildClient::new(config.build_api.clone())
            .context("Failed to create build API client")?,
    );
    let state_store: Arc<dyn StateStore> =
        Arc::new(FileStateStore::new(config.paths.state_dir.clone()));
    let stager: Arc<dyn Stager> = Arc::new(
        ArchiveStager::new(StagerConfig::new(config.paths.download_dir.clone()))
            .context("Failed to create stager")?,
    );
    let publisher: Arc<dyn Publisher> = Arc::new(ScriptPublisher::new(config.publisher.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(
        WebhookNotifier::new(&config.notifier).context("Failed to create notifier")?,
    );
    info!(
        "Using build source: {}, stager: {}, publisher: {}",
        builds.name(),
        stager.name(),
        publisher.name()
    );

    let orchestrator = Arc::new(SyncOrchestrator::new(
        targets,
        builds,
        state_store,
        stager,
        publisher,
        notifier,
    ));

    // Start the scheduler
    let scheduler = Arc::new(BuildSyncScheduler::new(orchestrator, &config.scheduler));
    scheduler.start();

    // Console trigger
    let (quit_tx, quit_rx) = watch::channel(false);
    match console::spawn_reader() {
        Ok(commands) => {
            tokio::spawn(console::run(Arc::clone(&scheduler), commands, quit_tx));
        }
        Err(e) => warn!("Console input unavailable: {}", e),
    }

    // Create app state and router
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, Arc::clone(&scheduler)));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(quit_rx))
        .await
        .context("Server error")?;

    info!("Stopping scheduler...");
    scheduler.stop().await;
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C, SIGTERM or console quit)
async fn shutdown_signal(mut quit_rx: watch::Receiver<bool>) {
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

    // Sender dropped means the console closed without quitting.
    let quit = async {
        if quit_rx.wait_for(|quit| *quit).await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = quit => {},
    }
    info!("Shutdown signal received");
}
