use std::net::SocketAddr;

use anyhow::Context;
use berthcare_api::logging::init_tracing;
use berthcare_api::{create_app, AppState};
use berthcare_data::Database;
use berthcare_domain::config::AppConfig;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// The main entry point for the BerthCare API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up redacted tracing output
/// 3. Opens the database and applies migrations, aborting on failure
/// 4. Creates and starts the Axum web application
/// 5. Closes the database after a graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config);

    info!("🚀 Starting {} ({})", config.service_name, config.environment.as_str());

    let db = Database::connect(&config.database).context("Failed to open database")?;
    let schema_version = db.migrate().await.context("Failed to apply database migrations")?;
    info!(schema_version, "{}", db.connection_info());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(&db, config);
    let app = create_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "server.start");

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close();
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on CTRL+C or, on Unix, SIGTERM
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
            Ok(mut stream) => {
                stream.recv().await;
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

    info!("Shutting down server...");
}
