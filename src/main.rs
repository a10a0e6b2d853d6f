//! HomeList maintenance process.
//!
//! Wires the store, the credential machinery and the services together,
//! then runs the scheduled session and blacklist sweeps until interrupted.
//! With `--once` both sweeps run a single time and the process exits.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use homelist_auth::{GoogleIdentityProvider, IdentityProvider};
use homelist_core::config::{AppConfig, StoreBackend};
use homelist_core::error::AppError;
use homelist_database::{DatabasePool, Store};
use homelist_service::Services;
use homelist_worker::{BlacklistSweepJob, CronScheduler, JobExecutor, SessionSweepJob};

/// HomeList maintenance: session and revocation sweeps
#[derive(Debug, Parser)]
#[command(name = "homelist-maintenance", version, long_about = None)]
struct Cli {
    /// Run both sweeps a single time and exit
    #[arg(long)]
    once: bool,

    /// Configuration environment overlay (overrides HOMELIST_ENV)
    #[arg(short, long)]
    env: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(cli.env.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, cli.once).await {
        tracing::error!(error = %e, "Maintenance process failed");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration(env: Option<&str>) -> Result<AppConfig, AppError> {
    let env = resolve_env(env, std::env::var("HOMELIST_ENV").ok());
    AppConfig::load(&env)
}

fn resolve_env(flag: Option<&str>, from_env: Option<String>) -> String {
    flag.map(str::to_string)
        .or(from_env)
        .unwrap_or_else(|| "development".to_string())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig, once: bool) -> Result<(), AppError> {
    tracing::info!("Starting HomeList maintenance v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Store ────────────────────────────────────────────
    let (store, db_pool) = match config.database.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            homelist_database::migration::run_migrations(db_pool.pool()).await?;

            (Store::postgres(db_pool.pool().clone()), Some(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; nothing survives a restart");
            (Store::memory(), None)
        }
    };

    // ── Step 2: Services ─────────────────────────────────────────
    let mut providers: Vec<Arc<dyn IdentityProvider>> = Vec::new();
    if config.oauth.google.is_configured() {
        providers.push(Arc::new(GoogleIdentityProvider::new(&config.oauth.google)?));
        tracing::info!("Google sign-in enabled");
    }
    let services = Services::build(&store, &config, providers)?;

    // ── Step 3: Maintenance jobs ─────────────────────────────────
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(SessionSweepJob::new(services.cleanup.clone())));
    executor.register(Arc::new(BlacklistSweepJob::new(services.cleanup.clone())));
    let executor = Arc::new(executor);

    if once {
        let report = services.cleanup.run_once().await?;
        tracing::info!(
            sessions_deleted = report.sessions_deleted,
            blacklist_deleted = report.blacklist_deleted,
            "One-shot maintenance finished"
        );
    } else if config.worker.enabled {
        let mut scheduler = CronScheduler::new(Arc::clone(&executor)).await?;
        scheduler.register_maintenance_tasks(&config.worker).await?;
        scheduler.start().await?;

        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        scheduler.shutdown().await?;
    } else {
        tracing::info!("Background worker disabled; nothing to do");
    }

    // ── Step 4: Teardown ─────────────────────────────────────────
    if let Some(db_pool) = db_pool {
        db_pool.close().await;
    }
    tracing::info!("HomeList maintenance stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
