// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for cluster-provisioner tests.
//!
//! Provides a simulated account backend, a task tracker and helpers for
//! building orchestrators and handler state around them.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cluster_provisioner::config::Config;
use cluster_provisioner::credentials::{LocalSessionProvider, ScopedClients};
use cluster_provisioner::handlers::ProvisionerState;
use cluster_provisioner::metrics;
use cluster_provisioner::orchestrator::{ClusterOrchestrator, OrchestratorSettings};
use cluster_provisioner::retry::RetryPolicy;
use cluster_provisioner::tags::{FLAVOR_TAG, ORG_TAG, RESOURCE_FLAVOR, RESOURCE_TYPE, TYPE_TAG, Tag, TagSet};
use cluster_provisioner::task::{MemoryTaskTracker, TaskTracker};
use cluster_provisioner::types::ClusterSpec;
use cluster_provisioner::upstream::InMemoryClusterApi;

pub const ACCOUNT: &str = "123456789012";
pub const TENANT: &str = "acme";
pub const OTHER_TENANT: &str = "globex";
pub const PREFIX: &str = "spinup";

/// Simulated account plus a task tracker.
pub struct Harness {
    pub backend: Arc<InMemoryClusterApi>,
    pub tracker: Arc<MemoryTaskTracker>,
    pub settings: OrchestratorSettings,
}

impl Harness {
    /// Backend whose resources become available on first describe.
    pub fn new() -> Self {
        Self::with_ready_after(1)
    }

    pub fn with_ready_after(describes: u32) -> Self {
        Self {
            backend: Arc::new(InMemoryClusterApi::new(ACCOUNT).with_ready_after(describes)),
            tracker: Arc::new(MemoryTaskTracker::default()),
            settings: OrchestratorSettings {
                resource_prefix: PREFIX.to_string(),
                convergence: RetryPolicy::new(5, Duration::from_secs(10)),
            },
        }
    }

    pub fn with_convergence(mut self, policy: RetryPolicy) -> Self {
        self.settings.convergence = policy;
        self
    }

    pub fn clients(&self) -> ScopedClients {
        ScopedClients {
            clusters: self.backend.clone(),
            tag_search: self.backend.clone(),
        }
    }

    /// Orchestrator acting for `tenant`.
    pub fn orchestrator_for(&self, tenant: &str) -> ClusterOrchestrator {
        let tracker: Arc<dyn TaskTracker> = self.tracker.clone();
        ClusterOrchestrator::new(tenant, self.clients(), tracker, self.settings.clone())
    }

    pub fn orchestrator(&self) -> ClusterOrchestrator {
        self.orchestrator_for(TENANT)
    }

    /// Seed an available cluster owned by `tenant`.
    pub async fn seed_cluster(&self, name: &str, tenant: &str) {
        self.backend.insert_cluster(name, owned_tags(tenant)).await;
    }
}

/// Reserved tags for `tenant`.
pub fn owned_tags(tenant: &str) -> TagSet {
    vec![
        Tag::new(ORG_TAG, tenant),
        Tag::new(TYPE_TAG, RESOURCE_TYPE),
        Tag::new(FLAVOR_TAG, RESOURCE_FLAVOR),
    ]
    .into()
}

/// A valid create request.
pub fn cluster_spec(name: &str, instances: u32) -> ClusterSpec {
    ClusterSpec {
        cluster_identifier: name.to_string(),
        instance_count: instances,
        instance_class: "db.r5.large".to_string(),
        master_username: Some("admin".to_string()),
        master_user_password: Some("s3cr3t-password".to_string()),
        subnet_ids: Some(vec!["subnet-b".to_string(), "subnet-a".to_string()]),
        vpc_security_group_ids: vec!["sg-1".to_string()],
        tags: vec![Tag::new("team", "payments")].into(),
        ..Default::default()
    }
}

/// Configuration for handler tests.
pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "PROVISIONER_ORG" => Some(TENANT.to_string()),
        "PROVISIONER_CONVERGENCE_ATTEMPTS" => Some("3".to_string()),
        "PROVISIONER_CONVERGENCE_DELAY_SECS" => Some("1".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Handler state on a local session provider, with metrics enabled.
pub fn test_state(
    sessions: Arc<LocalSessionProvider>,
) -> (Arc<ProvisionerState>, Arc<MemoryTaskTracker>) {
    let tracker = Arc::new(MemoryTaskTracker::default());
    let state = ProvisionerState::new(
        &test_config(),
        sessions,
        tracker.clone(),
        CancellationToken::new(),
    )
    .with_metrics(metrics::install().expect("metrics recorder"));
    (Arc::new(state), tracker)
}
