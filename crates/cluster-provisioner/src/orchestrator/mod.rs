// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cluster lifecycle orchestration.
//!
//! A [`ClusterOrchestrator`] is bound to one tenant and one set of scoped
//! clients. It turns lifecycle requests into ordered upstream calls:
//!
//! - create: subnet group, cluster, then instances `<id>-1..<id>-N`, then a
//!   detached convergence task reporting through the task tracker
//! - modify: cluster first, then each member instance
//! - delete: each member instance, then the cluster
//!
//! Nothing is rolled back. A failure part way through keeps its error kind
//! and names what was already done.

mod convergence;
mod subnet_group;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::arn::Arn;
use crate::credentials::{ScopedClients, SessionParams, SessionProvider};
use crate::error::{Error, Result};
use crate::metrics;
use crate::naming;
use crate::retry::RetryPolicy;
use crate::tags::{FLAVOR_TAG, ORG_TAG, RESOURCE_FLAVOR, RESOURCE_TYPE, TYPE_TAG, TagSet};
use crate::task::{Task, TaskTracker};
use crate::types::{
    ClusterDetails, ClusterSpec, CreateClusterResponse, ModifyClusterRequest, ModifyClusterResponse,
    PowerState,
};
use crate::upstream::{
    CLUSTER_RESOURCE_TYPE, Cluster, CreateClusterParams, CreateInstanceParams, DeleteClusterParams,
    ENGINE, ModifyClusterParams, ModifyInstanceParams, TagFilter,
};

pub use convergence::{ConvergenceHandle, ConvergenceOutcome};

/// Tunables shared by every orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Prefix for subnet group names
    pub resource_prefix: String,
    /// Polling policy for post-create convergence
    pub convergence: RetryPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            resource_prefix: "spinup".to_string(),
            convergence: RetryPolicy::default(),
        }
    }
}

/// Provider and parameters used to re-assume the session on every
/// convergence attempt.
#[derive(Clone)]
pub struct SessionRefresh {
    /// Session provider
    pub provider: Arc<dyn SessionProvider>,
    /// Parameters to assume with
    pub params: SessionParams,
}

impl SessionRefresh {
    async fn assume(&self) -> Result<ScopedClients> {
        self.provider.assume(&self.params).await
    }
}

/// Result of an accepted create.
pub struct Provisioning {
    /// Synchronous create results
    pub response: CreateClusterResponse,
    /// The task tracking convergence
    pub task: Task,
    /// Handle to the detached convergence task
    pub convergence: ConvergenceHandle,
}

/// Lifecycle operations for one tenant's clusters.
pub struct ClusterOrchestrator {
    tenant: String,
    clients: ScopedClients,
    tracker: Arc<dyn TaskTracker>,
    settings: OrchestratorSettings,
    session: Option<SessionRefresh>,
    shutdown: CancellationToken,
}

impl ClusterOrchestrator {
    /// Create an orchestrator for `tenant` using `clients`.
    pub fn new(
        tenant: impl Into<String>,
        clients: ScopedClients,
        tracker: Arc<dyn TaskTracker>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            clients,
            tracker,
            settings,
            session: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Re-assume the session before every convergence attempt.
    pub fn with_session_refresh(mut self, refresh: SessionRefresh) -> Self {
        self.session = Some(refresh);
        self
    }

    /// Cancel convergence tasks when `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Tenant this orchestrator acts for.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Provision a cluster and its instances, then start convergence
    /// tracking in the background.
    pub async fn create(&self, spec: ClusterSpec) -> Result<Provisioning> {
        let result = self.provision(spec).await;
        metrics::record_create(match &result {
            Ok(_) => "accepted",
            Err(e) => e.kind().as_str(),
        });
        result
    }

    async fn provision(&self, spec: ClusterSpec) -> Result<Provisioning> {
        spec.validate()?;

        let cluster_id = spec.cluster_identifier.clone();
        info!(
            tenant = %self.tenant,
            cluster = %cluster_id,
            instance_count = spec.instance_count,
            "Creating cluster"
        );

        let tags = spec.tags.normalize(&self.tenant);
        let group = naming::subnet_group_name(
            &self.settings.resource_prefix,
            &self.tenant,
            spec.subnets(),
        );
        self.ensure_subnet_group(&group, spec.subnets(), &tags).await?;

        let cluster = self
            .clients
            .clusters
            .create_cluster(CreateClusterParams {
                identifier: cluster_id.clone(),
                engine: ENGINE.to_string(),
                engine_version: spec.engine_version.clone(),
                backup_retention_period: spec.backup_retention_period,
                master_username: spec.master_username.clone(),
                master_user_password: spec.master_user_password.clone(),
                subnet_group_name: group,
                security_group_ids: spec.vpc_security_group_ids.clone(),
                storage_encrypted: true,
                tags: tags.clone(),
            })
            .await?;

        let mut instances = Vec::new();
        for ordinal in 1..=spec.instance_count {
            let name = naming::instance_identifier(&cluster_id, ordinal);
            let created = self
                .clients
                .clusters
                .create_instance(CreateInstanceParams {
                    identifier: name.clone(),
                    cluster_identifier: cluster_id.clone(),
                    class: spec.instance_class.clone(),
                    engine: ENGINE.to_string(),
                    auto_minor_version_upgrade: true,
                    tags: tags.clone(),
                })
                .await;

            match created {
                Ok(instance) => instances.push(instance),
                Err(e) => {
                    let done: Vec<&str> = instances.iter().map(|i| i.identifier.as_str()).collect();
                    let context = if done.is_empty() {
                        format!("cluster {} was created but instance {} failed", cluster_id, name)
                    } else {
                        format!(
                            "cluster {} and instances {} were created but instance {} failed",
                            cluster_id,
                            done.join(", "),
                            name
                        )
                    };
                    error!(tenant = %self.tenant, cluster = %cluster_id, instance = %name, error = %e, "Partial cluster creation");
                    return Err(e.with_context(context));
                }
            }
        }

        let task = match self.tracker.create().await {
            Ok(task) => task,
            Err(e) => {
                error!(cluster = %cluster_id, error = %e, "Failed to allocate task, convergence will not be tracked");
                Task::new()
            }
        };

        let convergence = convergence::spawn(
            convergence::ConvergenceWorker {
                cluster: cluster_id,
                clients: self.clients.clone(),
                session: self.session.clone(),
                policy: self.settings.convergence,
            },
            self.tracker.clone(),
            task.id.clone(),
            &self.shutdown,
        );

        Ok(Provisioning {
            response: CreateClusterResponse { cluster, instances },
            task,
            convergence,
        })
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Names of every cluster owned by the tenant.
    pub async fn list(&self) -> Result<Vec<String>> {
        let filters = [
            TagFilter::new(ORG_TAG, self.tenant.as_str()),
            TagFilter::new(TYPE_TAG, RESOURCE_TYPE),
            TagFilter::new(FLAVOR_TAG, RESOURCE_FLAVOR),
        ];
        let arns = self
            .clients
            .tag_search
            .get_resources(&filters, &[CLUSTER_RESOURCE_TYPE])
            .await?;

        let mut names = Vec::with_capacity(arns.len());
        for raw in arns {
            let arn: Arn = raw.parse()?;
            let name = arn.resource_name();
            // Every cluster is also listed under its resource id ARN.
            if !name.starts_with("cluster-") {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Cluster and its tags, if owned by the tenant.
    pub async fn details(&self, name: &str) -> Result<ClusterDetails> {
        let (cluster, tags) = self.owned_cluster(name).await?;
        Ok(ClusterDetails { cluster, tags })
    }

    // ========================================================================
    // Mutate
    // ========================================================================

    /// Apply cluster changes, then resize every member if an instance class
    /// is given.
    pub async fn modify(&self, name: &str, changes: ModifyClusterRequest) -> Result<ModifyClusterResponse> {
        let (current, _) = self.owned_cluster(name).await?;

        info!(tenant = %self.tenant, cluster = %name, "Modifying cluster");
        let cluster = self
            .clients
            .clusters
            .modify_cluster(ModifyClusterParams {
                identifier: name.to_string(),
                apply_immediately: true,
                backup_retention_period: changes.backup_retention_period,
                engine_version: changes.engine_version,
                master_user_password: changes.master_user_password,
                new_identifier: changes.new_cluster_identifier,
                security_group_ids: changes.vpc_security_group_ids,
            })
            .await?;

        let mut instances = Vec::new();
        if let Some(class) = changes.instance_class {
            for member in &current.members {
                let modified = self
                    .clients
                    .clusters
                    .modify_instance(ModifyInstanceParams {
                        identifier: member.instance_identifier.clone(),
                        apply_immediately: true,
                        class: Some(class.clone()),
                    })
                    .await;

                match modified {
                    Ok(instance) => instances.push(instance),
                    Err(e) => {
                        let done: Vec<&str> =
                            instances.iter().map(|i| i.identifier.as_str()).collect();
                        return Err(e.with_context(format!(
                            "cluster {} was modified (instances modified: [{}]) but instance {} failed",
                            name,
                            done.join(", "),
                            member.instance_identifier
                        )));
                    }
                }
            }
        }

        Ok(ModifyClusterResponse { cluster, instances })
    }

    /// Delete every member instance, then the cluster.
    pub async fn delete(&self, name: &str, snapshot: bool) -> Result<()> {
        let (cluster, _) = self.owned_cluster(name).await?;

        info!(tenant = %self.tenant, cluster = %name, snapshot = snapshot, "Deleting cluster");

        let mut deleted: Vec<&str> = Vec::with_capacity(cluster.members.len());
        for member in &cluster.members {
            if let Err(e) = self
                .clients
                .clusters
                .delete_instance(&member.instance_identifier)
                .await
            {
                return Err(e.with_context(format!(
                    "deleting cluster {} (instances deleted: [{}]) failed at instance {}",
                    name,
                    deleted.join(", "),
                    member.instance_identifier
                )));
            }
            deleted.push(&member.instance_identifier);
        }

        self.clients
            .clusters
            .delete_cluster(DeleteClusterParams::new(name, snapshot))
            .await
            .map_err(|e| {
                if deleted.is_empty() {
                    e
                } else {
                    e.with_context(format!(
                        "instances [{}] of cluster {} were deleted but the cluster was not",
                        deleted.join(", "),
                        name
                    ))
                }
            })?;
        Ok(())
    }

    /// Start or stop a cluster. `state` is matched case-insensitively.
    pub async fn set_state(&self, name: &str, state: &str) -> Result<()> {
        let state: PowerState = state.parse()?;
        if name.is_empty() {
            return Err(Error::BadRequest("cluster name is required".to_string()));
        }
        self.owned_cluster(name).await?;

        info!(tenant = %self.tenant, cluster = %name, state = ?state, "Changing cluster power state");
        match state {
            PowerState::Start => self.clients.clusters.start_cluster(name).await?,
            PowerState::Stop => self.clients.clusters.stop_cluster(name).await?,
        };
        Ok(())
    }

    /// Look up a cluster and verify the tenant owns it. Clusters owned by
    /// anyone else are indistinguishable from missing ones.
    async fn owned_cluster(&self, name: &str) -> Result<(Cluster, TagSet)> {
        if name.is_empty() {
            return Err(Error::BadRequest("cluster name is required".to_string()));
        }

        let cluster = self.clients.clusters.describe_cluster(name).await?;
        let tags = self.clients.clusters.list_tags(&cluster.arn).await?;
        if !tags.belongs_to_tenant(&self.tenant) {
            return Err(Error::NotFound(format!("cluster {} not found", name)));
        }
        Ok((cluster, tags))
    }
}
