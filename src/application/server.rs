use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::services::favicon_refresh::favicon_refresh_task;
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::database::Database;
use crate::infrastructure::favicon::{HttpFaviconResolver, ResolverConfig};
use crate::infrastructure::notifier::{BroadcastNotifier, log_favicon_events};

const NOTIFICATION_BUFFER: usize = 256;
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub resolver: ResolverConfig,
    pub refresh_interval: Duration,
    pub refresh_concurrency: usize,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let resolver =
        HttpFaviconResolver::new(&config.resolver).context("failed to build HTTP client")?;
    let notifier = BroadcastNotifier::new(NOTIFICATION_BUFFER);
    tokio::spawn(log_favicon_events(notifier.subscribe()));

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            resolver: Arc::new(resolver),
            notifier: Arc::new(notifier),
            refresh_concurrency: config.refresh_concurrency,
        },
    );

    // Spawn background favicon refresh task
    let refresh_interval = config.refresh_interval.max(MIN_REFRESH_INTERVAL);
    tokio::spawn(favicon_refresh_task(
        state.favicon_refresher.clone(),
        refresh_interval,
    ));
    info!(
        interval_secs = refresh_interval.as_secs(),
        concurrency = config.refresh_concurrency,
        site_timeout_secs = config.resolver.deadline.as_secs(),
        "favicon refresh scheduled"
    );

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
