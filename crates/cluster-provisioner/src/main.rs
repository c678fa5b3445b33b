// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cluster Provisioner - Managed Document-Database Control Plane Server
//!
//! An HTTP server responsible for:
//! - Cluster lifecycle (create, list, details, modify, delete, power state)
//! - Tenant isolation through ownership tags
//! - Convergence tracking of newly created clusters as tasks

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cluster_provisioner::config::Config;
use cluster_provisioner::credentials::{LocalSessionProvider, SessionProvider};
use cluster_provisioner::handlers::ProvisionerState;
use cluster_provisioner::{metrics, server};
use cluster_provisioner::task::{MemoryTaskTracker, RedisTaskTracker, TaskTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cluster_provisioner=info,tower_http=info".into()),
        )
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;

    info!(
        org = %config.org,
        listen_addr = %config.listen_addr,
        role_name = %config.role_name,
        convergence_attempts = config.convergence_attempts,
        convergence_delay_secs = config.convergence_delay.as_secs(),
        "Starting Cluster Provisioner"
    );

    let tracker: Arc<dyn TaskTracker> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisTaskTracker::connect(url, &config.task_namespace, config.task_ttl).await?,
        ),
        None => {
            warn!("PROVISIONER_REDIS_URL not set, tasks are kept in memory");
            Arc::new(MemoryTaskTracker::new(config.task_ttl))
        }
    };

    warn!("Using the in-memory simulated upstream; no real clusters will be provisioned");
    let sessions: Arc<dyn SessionProvider> = Arc::new(LocalSessionProvider::new());

    let metrics = metrics::install()?;

    let shutdown = CancellationToken::new();
    let state = Arc::new(
        ProvisionerState::new(&config, sessions, tracker, shutdown.clone()).with_metrics(metrics),
    );

    let mut server = tokio::spawn(server::serve(config.listen_addr, state, shutdown.clone()));

    tokio::select! {
        res = &mut server => {
            // Server exited on its own, usually a bind failure.
            res??;
            return Ok(());
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Shutdown signal received");
        }
    }

    // Graceful shutdown
    shutdown.cancel();
    server.await??;

    info!("Cluster Provisioner shut down");

    Ok(())
}
