// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP request handlers.
//!
//! Each handler assumes a role in the target account with the permissions
//! that request needs, builds a [`ClusterOrchestrator`] bound to the
//! configured tenant, and encodes the result.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::credentials::{
    FULL_ACCESS_POLICY, READ_ONLY_POLICY, SessionParams, SessionProvider, TAG_READ_ONLY_POLICY,
    generate_policy,
};
use crate::error::{Error, Result};
use crate::metrics::CONTENT_TYPE as METRICS_CONTENT_TYPE;
use crate::orchestrator::{ClusterOrchestrator, OrchestratorSettings, SessionRefresh};
use crate::task::TaskTracker;
use crate::types::{ClusterSpec, ModifyClusterRequest, PowerStateRequest};

/// Response header carrying the id of the task tracking a create.
pub const TASK_ID_HEADER: &str = "x-task-id";
/// Response header carrying the number of listed items.
pub const ITEMS_HEADER: &str = "x-items";

/// Actions allowed by the inline policy of power state changes.
const POWER_ACTIONS: [&str; 4] = [
    "rds:DescribeDBClusters",
    "rds:ListTagsForResource",
    "rds:StartDBCluster",
    "rds:StopDBCluster",
];

/// Shared state for provisioner handlers.
pub struct ProvisionerState {
    /// Tenant organization served
    pub org: String,
    /// Role assumed in tenant accounts
    pub role_name: String,
    /// External id presented when assuming
    pub external_id: Option<String>,
    /// Orchestrator tunables
    pub settings: OrchestratorSettings,
    /// Role assumption
    pub sessions: Arc<dyn SessionProvider>,
    /// Task store
    pub tracker: Arc<dyn TaskTracker>,
    /// Service shutdown token; convergence tasks run under children of it
    pub shutdown: CancellationToken,
    /// When the server started (for uptime calculation).
    pub start_time: std::time::Instant,
    /// Server version string.
    pub version: String,
    /// Renders `/metrics`; unset when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ProvisionerState {
    /// Create handler state from configuration.
    pub fn new(
        config: &Config,
        sessions: Arc<dyn SessionProvider>,
        tracker: Arc<dyn TaskTracker>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            org: config.org.clone(),
            role_name: config.role_name.clone(),
            external_id: config.external_id.clone(),
            settings: OrchestratorSettings {
                resource_prefix: config.resource_prefix.clone(),
                convergence: config.convergence_policy(),
            },
            sessions,
            tracker,
            shutdown,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics: None,
        }
    }

    /// Expose metrics rendered by `handle`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get the server uptime in milliseconds.
    pub fn uptime_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }

    fn session_params(&self, account: &str, policies: &[&str]) -> SessionParams {
        SessionParams::new(account, &self.role_name, self.external_id.clone(), policies)
    }

    /// Assume `params` and build an orchestrator on the resulting clients.
    async fn orchestrator(&self, params: SessionParams) -> Result<ClusterOrchestrator> {
        let clients = self.sessions.assume(&params).await.map_err(|e| {
            warn!(account = %params.account, role_arn = %params.role_arn, error = %e, "Failed to assume role");
            Error::Forbidden(format!("failed to assume role in account: {}", params.account))
        })?;

        Ok(ClusterOrchestrator::new(
            self.org.clone(),
            clients,
            self.tracker.clone(),
            self.settings.clone(),
        )
        .with_session_refresh(SessionRefresh {
            provider: self.sessions.clone(),
            params,
        })
        .with_shutdown(self.shutdown.clone()))
    }
}

type AppState = State<Arc<ProvisionerState>>;

// ============================================================================
// Service
// ============================================================================

/// Liveness check.
pub async fn ping() -> &'static str {
    "pong"
}

/// Version response.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Server version
    pub version: String,
    /// Uptime in milliseconds
    pub uptime_ms: i64,
}

/// Build information.
pub async fn version(State(state): AppState) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.version.clone(),
        uptime_ms: state.uptime_ms(),
    })
}

/// Prometheus exposition of the service counters.
pub async fn metrics(State(state): AppState) -> Result<impl IntoResponse> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| Error::ServiceUnavailable("metrics are not enabled".to_string()))?;
    Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], handle.render()))
}

/// Task status and event log.
pub async fn get_task(State(state): AppState, Path(id): Path<String>) -> Result<impl IntoResponse> {
    match state.tracker.get(&id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(Error::NotFound(format!("task {} not found", id))),
    }
}

// ============================================================================
// Clusters
// ============================================================================

/// Create a cluster. Answers 202 once the upstream accepted the cluster and
/// its instances; convergence continues in the background.
pub async fn create_cluster(
    State(state): AppState,
    Path(account): Path<String>,
    body: std::result::Result<Json<ClusterSpec>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let orch = state
        .orchestrator(state.session_params(&account, &[FULL_ACCESS_POLICY]))
        .await?;

    let Json(spec) = body.map_err(|e| {
        Error::BadRequest(format!(
            "cannot decode body into create cluster input: {}",
            e.body_text()
        ))
    })?;

    let provisioning = orch.create(spec).await?;
    info!(
        account = %account,
        cluster = %provisioning.response.cluster.identifier,
        task_id = %provisioning.task.id,
        "Cluster creation accepted"
    );
    provisioning.convergence.detach();

    Ok((
        StatusCode::ACCEPTED,
        [(TASK_ID_HEADER, provisioning.task.id)],
        Json(provisioning.response),
    ))
}

/// Names of the tenant's clusters.
pub async fn list_clusters(
    State(state): AppState,
    Path(account): Path<String>,
) -> Result<impl IntoResponse> {
    let orch = state
        .orchestrator(state.session_params(&account, &[READ_ONLY_POLICY, TAG_READ_ONLY_POLICY]))
        .await?;

    let names = orch.list().await?;
    Ok(([(ITEMS_HEADER, names.len().to_string())], Json(names)))
}

/// Cluster details and tags.
pub async fn get_cluster(
    State(state): AppState,
    Path((account, name)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let orch = state
        .orchestrator(state.session_params(&account, &[READ_ONLY_POLICY]))
        .await?;

    Ok(Json(orch.details(&name).await?))
}

/// Modify a cluster.
pub async fn modify_cluster(
    State(state): AppState,
    Path((account, name)): Path<(String, String)>,
    body: std::result::Result<Json<ModifyClusterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let orch = state
        .orchestrator(state.session_params(&account, &[FULL_ACCESS_POLICY]))
        .await?;

    let Json(changes) = body.map_err(|e| {
        Error::BadRequest(format!(
            "cannot decode body into modify cluster input: {}",
            e.body_text()
        ))
    })?;

    Ok(Json(orch.modify(&name, changes).await?))
}

/// Start or stop a cluster.
pub async fn set_power_state(
    State(state): AppState,
    Path((account, name)): Path<(String, String)>,
    body: std::result::Result<Json<PowerStateRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(req) = body.map_err(|e| {
        Error::BadRequest(format!(
            "cannot decode body into power state input: {}",
            e.body_text()
        ))
    })?;
    let desired = req
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::BadRequest("state is required".to_string()))?;

    let params = state
        .session_params(&account, &[FULL_ACCESS_POLICY])
        .with_inline_policy(generate_policy(&POWER_ACTIONS)?);
    let orch = state.orchestrator(params).await?;

    orch.set_state(&name, &desired).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a cluster, optionally keeping a final snapshot.
pub async fn delete_cluster(
    State(state): AppState,
    Path((account, name)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode> {
    let snapshot = query.get("snapshot").map(|v| parse_bool(v)).unwrap_or(false);

    let orch = state
        .orchestrator(state.session_params(&account, &[FULL_ACCESS_POLICY]))
        .await?;

    orch.delete(&name, snapshot).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lenient boolean parsing; anything unrecognised is false.
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        for v in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "false", "yes", "", "tRuE", "2"] {
            assert!(!parse_bool(v), "{v}");
        }
    }
}
