//! Roomkey reservation engine daemon.
//!
//! Runs migrations and the booking reconciliation sweeper. The HTTP
//! API and the device transport run in separate services and use this
//! crate as a library.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use roomkey::domain::RepositoryProvider;
use roomkey::infrastructure::database::migrator::Migrator;
use roomkey::shared::shutdown::ShutdownCoordinator;
use roomkey::{
    default_config_path, init_database, start_booking_sweeper_task, AppConfig, DatabaseConfig,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("ROOMKEY_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Roomkey reservation engine...");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── Shutdown coordination ──────────────────────────────────
    let shutdown = ShutdownCoordinator::new();
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── Reconciliation sweeper ─────────────────────────────────
    start_booking_sweeper_task(
        repos,
        shutdown_signal.clone(),
        app_cfg.sweeper.check_interval_secs,
    );

    info!("Reservation engine started. Press Ctrl+C to shutdown gracefully.");
    shutdown_signal.wait().await;

    // ── Final cleanup ──────────────────────────────────────────
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Roomkey reservation engine shutdown complete");
    Ok(())
}
