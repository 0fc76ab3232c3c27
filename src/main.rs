//! AceDesk
//!
//! Main application entry point

use std::net::SocketAddr;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use AceDesk::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    router,
    utils::logging,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", AceDesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await.context("failed to connect to database")?;
    run_migrations(&pool).await?;
    let database = DatabaseService::new(pool);

    // Initialize services
    info!("Initializing services...");
    let bind_address = settings.bind_address();
    let state = AppState::new(settings, database)?;

    state.rate_limiter.spawn_cleanup();

    let health = state.services.health_check().await;
    for issue in health.get_issues() {
        warn!("Startup health issue: {}", issue);
    }

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, router(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
