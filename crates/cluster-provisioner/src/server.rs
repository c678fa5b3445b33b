// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP router and server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::handlers::{self, ProvisionerState};
use crate::metrics;

/// Path prefix of every route.
pub const API_PREFIX: &str = "/v1/docdb";

/// Build the application router.
pub fn router(state: Arc<ProvisionerState>) -> Router {
    let api = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/version", get(handlers::version))
        .route("/metrics", get(handlers::metrics))
        .route("/tasks/{id}", get(handlers::get_task))
        .route(
            "/{account}",
            post(handlers::create_cluster).get(handlers::list_clusters),
        )
        .route(
            "/{account}/{name}",
            get(handlers::get_cluster)
                .put(handlers::modify_cluster)
                .delete(handlers::delete_cluster),
        )
        .route("/{account}/{name}/power", put(handlers::set_power_state));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<ProvisionerState>,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
