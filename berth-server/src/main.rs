//! Berth Server
//!
//! Multi-tenant backend for hosting per-user game servers. Users register an
//! account, install the server template into their own directory, launch
//! their server as a detached process, and move save archives in and out.
//!
//! Architecture:
//! - API: axum handlers, bearer-token gated
//! - Services: business logic (auth, launch, install, saves)
//! - Registry: shared task-state map polled by clients
//! - Dispatcher: bounded worker pool running launches off the request path
//! - Launcher: spawns the server process and probes whether it came up

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod archive;
pub mod auth;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod launcher;
pub mod registry;
pub mod repository;
pub mod service;
pub mod state;
pub mod userdirs;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::launcher::{FixedDelayProbe, ProcessLauncher};
use crate::registry::TaskRegistry;
use crate::state::AppState;
use crate::userdirs::UserDirs;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "berth_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Berth server...");

    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    tracing::info!(
        "Loaded configuration: bind_addr={}, data_root={}, workers={}",
        config.bind_addr,
        config.data_root.display(),
        config.worker_count
    );

    std::fs::create_dir_all(&config.data_root).expect("Failed to create data root");

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Task orchestration: registry shared by handlers and workers, launcher
    // behind the dispatcher's worker pool
    let registry = Arc::new(TaskRegistry::new());

    let launcher = Arc::new(ProcessLauncher::new(
        config.launch_command.clone(),
        config.data_root.clone(),
        Arc::new(FixedDelayProbe::new(config.startup_probe)),
    ));

    let dispatcher = Dispatcher::start(
        config.worker_count,
        config.queue_capacity,
        launcher,
        Arc::clone(&registry),
    );

    let sweeper = start_registry_sweeper(
        Arc::clone(&registry),
        config.task_retention,
        config.sweep_interval,
    );

    let dirs = Arc::new(UserDirs::new(config.data_root.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        registry,
        dispatcher: dispatcher.handle(),
        dirs,
    };

    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // The router (and its dispatcher handle) is gone once serve returns, so
    // shutdown can drain the queue and wait for in-flight launches
    sweeper.abort();
    dispatcher.shutdown().await;

    tracing::info!("Shutdown complete");
}

/// Periodically evicts expired terminal tasks from the registry
fn start_registry_sweeper(
    registry: Arc<TaskRegistry>,
    retention: std::time::Duration,
    interval: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let evicted = registry.evict_expired(retention);
            if evicted > 0 {
                tracing::info!("Registry sweep evicted {} task(s)", evicted);
            }
        }
    })
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");

    tracing::info!("Shutdown signal received");
}
