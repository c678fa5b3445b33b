// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory upstream for local runs and testing.
//!
//! Simulates the cluster-management and tag-search APIs of one account.
//! Clusters and instances report `creating` until they have been described
//! a configurable number of times. Every call is recorded, and one-shot
//! failures carrying vendor codes can be injected per operation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::errors::{codes, from_code};
use super::traits::{ClusterApi, TagSearchApi};
use super::types::*;
use crate::error::Result;
use crate::tags::TagSet;

const REGION: &str = "us-east-1";
const PORT: u16 = 27017;

/// Upstream operation names, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    CreateCluster,
    CreateInstance,
    ModifyCluster,
    ModifyInstance,
    DeleteCluster,
    DeleteInstance,
    DescribeCluster,
    DescribeInstances,
    ListTags,
    DescribeSubnetGroups,
    CreateSubnetGroup,
    StartCluster,
    StopCluster,
    GetResources,
}

/// A recorded upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum UpstreamCall {
    CreateCluster { identifier: String, subnet_group: String, storage_encrypted: bool },
    CreateInstance { identifier: String, cluster: String },
    ModifyCluster { identifier: String },
    ModifyInstance { identifier: String, class: Option<String> },
    DeleteCluster(DeleteClusterParams),
    DeleteInstance { identifier: String },
    DescribeCluster { identifier: String },
    DescribeInstances { cluster: String },
    ListTags { arn: String },
    DescribeSubnetGroups { name: String },
    CreateSubnetGroup { name: String, subnet_ids: Vec<String> },
    StartCluster { identifier: String },
    StopCluster { identifier: String },
    GetResources { filters: Vec<TagFilter> },
}

impl UpstreamCall {
    /// The operation this call invoked.
    pub fn operation(&self) -> Operation {
        match self {
            UpstreamCall::CreateCluster { .. } => Operation::CreateCluster,
            UpstreamCall::CreateInstance { .. } => Operation::CreateInstance,
            UpstreamCall::ModifyCluster { .. } => Operation::ModifyCluster,
            UpstreamCall::ModifyInstance { .. } => Operation::ModifyInstance,
            UpstreamCall::DeleteCluster(_) => Operation::DeleteCluster,
            UpstreamCall::DeleteInstance { .. } => Operation::DeleteInstance,
            UpstreamCall::DescribeCluster { .. } => Operation::DescribeCluster,
            UpstreamCall::DescribeInstances { .. } => Operation::DescribeInstances,
            UpstreamCall::ListTags { .. } => Operation::ListTags,
            UpstreamCall::DescribeSubnetGroups { .. } => Operation::DescribeSubnetGroups,
            UpstreamCall::CreateSubnetGroup { .. } => Operation::CreateSubnetGroup,
            UpstreamCall::StartCluster { .. } => Operation::StartCluster,
            UpstreamCall::StopCluster { .. } => Operation::StopCluster,
            UpstreamCall::GetResources { .. } => Operation::GetResources,
        }
    }

    /// The resource the call addressed, if any.
    fn target(&self) -> Option<&str> {
        match self {
            UpstreamCall::CreateCluster { identifier, .. }
            | UpstreamCall::CreateInstance { identifier, .. }
            | UpstreamCall::ModifyCluster { identifier }
            | UpstreamCall::ModifyInstance { identifier, .. }
            | UpstreamCall::DeleteInstance { identifier }
            | UpstreamCall::DescribeCluster { identifier }
            | UpstreamCall::StartCluster { identifier }
            | UpstreamCall::StopCluster { identifier } => Some(identifier),
            UpstreamCall::DeleteCluster(params) => Some(&params.identifier),
            UpstreamCall::DescribeInstances { cluster } => Some(cluster),
            UpstreamCall::ListTags { arn } => Some(arn),
            UpstreamCall::DescribeSubnetGroups { name }
            | UpstreamCall::CreateSubnetGroup { name, .. } => Some(name),
            UpstreamCall::GetResources { .. } => None,
        }
    }
}

#[derive(Debug)]
struct InjectedFailure {
    operation: Operation,
    target: Option<String>,
    code: String,
}

#[derive(Debug)]
struct StoredCluster {
    cluster: Cluster,
    describes_until_ready: u32,
}

#[derive(Debug)]
struct StoredInstance {
    instance: Instance,
    describes_until_ready: u32,
}

#[derive(Debug, Default)]
struct State {
    clusters: BTreeMap<String, StoredCluster>,
    instances: BTreeMap<String, StoredInstance>,
    subnet_groups: Vec<SubnetGroup>,
    tags: HashMap<String, TagSet>,
    calls: Vec<UpstreamCall>,
    failures: Vec<InjectedFailure>,
}

impl State {
    /// Record a call and consume a matching injected failure.
    fn begin(&mut self, call: UpstreamCall) -> Result<()> {
        let operation = call.operation();
        let target = call.target().map(str::to_string);
        self.calls.push(call);

        let hit = self.failures.iter().position(|f| {
            f.operation == operation
                && f.target
                    .as_deref()
                    .is_none_or(|t| Some(t) == target.as_deref())
        });
        match hit {
            Some(idx) => {
                let failure = self.failures.remove(idx);
                Err(from_code(&failure.code, "injected failure"))
            }
            None => Ok(()),
        }
    }

    /// Cluster view with its current members.
    fn render_cluster(&self, identifier: &str) -> Option<Cluster> {
        let stored = self.clusters.get(identifier)?;
        let mut cluster = stored.cluster.clone();
        cluster.members = self
            .instances
            .values()
            .filter(|i| i.instance.cluster_identifier == identifier)
            .enumerate()
            .map(|(idx, i)| ClusterMember {
                instance_identifier: i.instance.identifier.clone(),
                is_cluster_writer: idx == 0,
                promotion_tier: i.instance.promotion_tier,
            })
            .collect();
        Some(cluster)
    }

    fn cluster_not_found(identifier: &str) -> crate::Error {
        from_code(
            codes::DB_CLUSTER_NOT_FOUND,
            format!("DBCluster {} not found", identifier),
        )
    }
}

/// Simulated upstream for one account.
pub struct InMemoryClusterApi {
    account_id: String,
    ready_after: u32,
    state: Mutex<State>,
}

impl InMemoryClusterApi {
    /// Create an empty backend for `account_id` whose resources become
    /// available on first describe.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ready_after: 1,
            state: Mutex::new(State::default()),
        }
    }

    /// Resources report `creating` for the first `describes` describe calls.
    /// Zero makes them available immediately.
    pub fn with_ready_after(mut self, describes: u32) -> Self {
        self.ready_after = describes;
        self
    }

    /// Account this backend simulates.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn cluster_arn(&self, identifier: &str) -> String {
        format!("arn:aws:rds:{}:{}:cluster:{}", REGION, self.account_id, identifier)
    }

    fn initial_status(&self) -> &'static str {
        if self.ready_after == 0 { STATUS_AVAILABLE } else { "creating" }
    }

    /// Fail the next call to `operation` (optionally only for `target`) with
    /// the vendor `code`.
    pub async fn inject_failure(&self, operation: Operation, target: Option<&str>, code: &str) {
        self.state.lock().await.failures.push(InjectedFailure {
            operation,
            target: target.map(str::to_string),
            code: code.to_string(),
        });
    }

    /// Seed an available cluster with `tags`, bypassing call recording.
    pub async fn insert_cluster(&self, identifier: &str, tags: TagSet) -> Cluster {
        let cluster = self.new_cluster(identifier, STATUS_AVAILABLE);
        let mut state = self.state.lock().await;
        state.tags.insert(cluster.arn.clone(), tags);
        state.clusters.insert(
            identifier.to_string(),
            StoredCluster {
                cluster: cluster.clone(),
                describes_until_ready: 0,
            },
        );
        cluster
    }

    /// Seed a subnet group, bypassing name uniqueness.
    pub async fn insert_subnet_group(&self, name: &str, subnet_ids: Vec<String>) {
        let group = self.new_subnet_group(name, String::new(), subnet_ids);
        self.state.lock().await.subnet_groups.push(group);
    }

    /// Every call recorded so far, in order.
    pub async fn calls(&self) -> Vec<UpstreamCall> {
        self.state.lock().await.calls.clone()
    }

    /// Forget recorded calls.
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Subnet groups currently stored.
    pub async fn subnet_groups(&self) -> Vec<SubnetGroup> {
        self.state.lock().await.subnet_groups.clone()
    }

    /// Force a cluster status, e.g. to simulate a stopped cluster.
    pub async fn set_cluster_status(&self, identifier: &str, status: &str) {
        if let Some(stored) = self.state.lock().await.clusters.get_mut(identifier) {
            stored.cluster.status = status.to_string();
            stored.describes_until_ready = 0;
        }
    }

    fn new_cluster(&self, identifier: &str, status: &str) -> Cluster {
        Cluster {
            identifier: identifier.to_string(),
            arn: self.cluster_arn(identifier),
            resource_id: format!(
                "cluster-{}",
                Uuid::new_v4().simple().to_string().to_uppercase()
            ),
            status: status.to_string(),
            engine: ENGINE.to_string(),
            engine_version: Some("5.0.0".to_string()),
            endpoint: Some(format!(
                "{}.cluster-{}.{}.docdb.amazonaws.com",
                identifier, self.account_id, REGION
            )),
            reader_endpoint: Some(format!(
                "{}.cluster-ro-{}.{}.docdb.amazonaws.com",
                identifier, self.account_id, REGION
            )),
            port: Some(PORT),
            storage_encrypted: true,
            subnet_group: None,
            backup_retention_period: Some(1),
            master_username: None,
            security_group_ids: Vec::new(),
            members: Vec::new(),
            cluster_create_time: Some(Utc::now()),
        }
    }

    fn new_subnet_group(&self, name: &str, description: String, subnet_ids: Vec<String>) -> SubnetGroup {
        SubnetGroup {
            name: name.to_string(),
            description,
            subnet_group_status: "Complete".to_string(),
            subnet_ids,
            arn: format!("arn:aws:rds:{}:{}:subgrp:{}", REGION, self.account_id, name),
        }
    }
}

#[async_trait]
impl ClusterApi for InMemoryClusterApi {
    async fn create_cluster(&self, params: CreateClusterParams) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::CreateCluster {
            identifier: params.identifier.clone(),
            subnet_group: params.subnet_group_name.clone(),
            storage_encrypted: params.storage_encrypted,
        })?;

        if state.clusters.contains_key(&params.identifier) {
            return Err(from_code(
                codes::DB_CLUSTER_ALREADY_EXISTS,
                format!("DBCluster {} already exists", params.identifier),
            ));
        }
        if !state
            .subnet_groups
            .iter()
            .any(|g| g.name == params.subnet_group_name)
        {
            return Err(from_code(
                codes::DB_SUBNET_GROUP_NOT_FOUND,
                format!("DBSubnetGroup {} not found", params.subnet_group_name),
            ));
        }

        let mut cluster = self.new_cluster(&params.identifier, self.initial_status());
        cluster.engine = params.engine;
        if params.engine_version.is_some() {
            cluster.engine_version = params.engine_version;
        }
        if params.backup_retention_period.is_some() {
            cluster.backup_retention_period = params.backup_retention_period;
        }
        cluster.storage_encrypted = params.storage_encrypted;
        cluster.subnet_group = Some(params.subnet_group_name);
        cluster.master_username = params.master_username;
        cluster.security_group_ids = params.security_group_ids;

        state.tags.insert(cluster.arn.clone(), params.tags);
        state.clusters.insert(
            params.identifier,
            StoredCluster {
                cluster: cluster.clone(),
                describes_until_ready: self.ready_after,
            },
        );
        Ok(cluster)
    }

    async fn create_instance(&self, params: CreateInstanceParams) -> Result<Instance> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::CreateInstance {
            identifier: params.identifier.clone(),
            cluster: params.cluster_identifier.clone(),
        })?;

        if !state.clusters.contains_key(&params.cluster_identifier) {
            return Err(State::cluster_not_found(&params.cluster_identifier));
        }
        if state.instances.contains_key(&params.identifier) {
            return Err(from_code(
                codes::DB_INSTANCE_ALREADY_EXISTS,
                format!("DBInstance {} already exists", params.identifier),
            ));
        }

        let ordinal = state
            .instances
            .values()
            .filter(|i| i.instance.cluster_identifier == params.cluster_identifier)
            .count() as u32;
        let instance = Instance {
            endpoint: Some(format!(
                "{}.{}.{}.docdb.amazonaws.com",
                params.identifier, self.account_id, REGION
            )),
            identifier: params.identifier.clone(),
            cluster_identifier: params.cluster_identifier,
            class: params.class,
            status: self.initial_status().to_string(),
            engine: params.engine,
            engine_version: Some("5.0.0".to_string()),
            availability_zone: Some(format!("{}{}", REGION, ['a', 'b', 'c'][ordinal as usize % 3])),
            promotion_tier: Some(1),
        };

        state.tags.insert(
            format!("arn:aws:rds:{}:{}:db:{}", REGION, self.account_id, params.identifier),
            params.tags,
        );
        state.instances.insert(
            params.identifier,
            StoredInstance {
                instance: instance.clone(),
                describes_until_ready: self.ready_after,
            },
        );
        Ok(instance)
    }

    async fn modify_cluster(&self, params: ModifyClusterParams) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::ModifyCluster {
            identifier: params.identifier.clone(),
        })?;

        if !state.clusters.contains_key(&params.identifier) {
            return Err(State::cluster_not_found(&params.identifier));
        }
        let rename = params
            .new_identifier
            .filter(|new_id| *new_id != params.identifier);
        if let Some(new_id) = rename.as_ref().filter(|id| state.clusters.contains_key(*id)) {
            return Err(from_code(
                codes::DB_CLUSTER_ALREADY_EXISTS,
                format!("DBCluster {} already exists", new_id),
            ));
        }

        let Some(mut stored) = state.clusters.remove(&params.identifier) else {
            return Err(State::cluster_not_found(&params.identifier));
        };

        let cluster = &mut stored.cluster;
        if let Some(days) = params.backup_retention_period {
            cluster.backup_retention_period = Some(days);
        }
        if let Some(version) = params.engine_version {
            cluster.engine_version = Some(version);
        }
        if let Some(groups) = params.security_group_ids {
            cluster.security_group_ids = groups;
        }

        let identifier = match rename {
            Some(new_id) => {
                let old_arn = cluster.arn.clone();
                cluster.identifier = new_id.clone();
                cluster.arn = self.cluster_arn(&new_id);
                if let Some(tags) = state.tags.remove(&old_arn) {
                    state.tags.insert(cluster.arn.clone(), tags);
                }
                for i in state.instances.values_mut() {
                    if i.instance.cluster_identifier == params.identifier {
                        i.instance.cluster_identifier = new_id.clone();
                    }
                }
                new_id
            }
            None => params.identifier,
        };

        state.clusters.insert(identifier.clone(), stored);
        state
            .render_cluster(&identifier)
            .ok_or_else(|| State::cluster_not_found(&identifier))
    }

    async fn modify_instance(&self, params: ModifyInstanceParams) -> Result<Instance> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::ModifyInstance {
            identifier: params.identifier.clone(),
            class: params.class.clone(),
        })?;

        let stored = state.instances.get_mut(&params.identifier).ok_or_else(|| {
            from_code(
                codes::DB_INSTANCE_NOT_FOUND,
                format!("DBInstance {} not found", params.identifier),
            )
        })?;
        if let Some(class) = params.class {
            stored.instance.class = class;
        }
        Ok(stored.instance.clone())
    }

    async fn delete_cluster(&self, params: DeleteClusterParams) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::DeleteCluster(params.clone()))?;

        let mut cluster = state
            .render_cluster(&params.identifier)
            .ok_or_else(|| State::cluster_not_found(&params.identifier))?;
        if !cluster.members.is_empty() {
            return Err(from_code(
                codes::INVALID_DB_CLUSTER_STATE,
                format!("DBCluster {} still has member instances", params.identifier),
            ));
        }

        state.clusters.remove(&params.identifier);
        state.tags.remove(&cluster.arn);
        cluster.status = "deleting".to_string();
        Ok(cluster)
    }

    async fn delete_instance(&self, identifier: &str) -> Result<Instance> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::DeleteInstance {
            identifier: identifier.to_string(),
        })?;

        let mut stored = state.instances.remove(identifier).ok_or_else(|| {
            from_code(
                codes::DB_INSTANCE_NOT_FOUND,
                format!("DBInstance {} not found", identifier),
            )
        })?;
        stored.instance.status = "deleting".to_string();
        Ok(stored.instance)
    }

    async fn describe_cluster(&self, identifier: &str) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::DescribeCluster {
            identifier: identifier.to_string(),
        })?;

        let stored = state
            .clusters
            .get_mut(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))?;
        if stored.describes_until_ready > 0 {
            stored.describes_until_ready -= 1;
            if stored.describes_until_ready == 0 {
                stored.cluster.status = STATUS_AVAILABLE.to_string();
            }
        }

        state
            .render_cluster(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))
    }

    async fn describe_instances(&self, cluster_identifier: &str) -> Result<Vec<Instance>> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::DescribeInstances {
            cluster: cluster_identifier.to_string(),
        })?;

        let mut out = Vec::new();
        for stored in state.instances.values_mut() {
            if stored.instance.cluster_identifier != cluster_identifier {
                continue;
            }
            if stored.describes_until_ready > 0 {
                stored.describes_until_ready -= 1;
                if stored.describes_until_ready == 0 {
                    stored.instance.status = STATUS_AVAILABLE.to_string();
                }
            }
            out.push(stored.instance.clone());
        }
        Ok(out)
    }

    async fn list_tags(&self, arn: &str) -> Result<TagSet> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::ListTags {
            arn: arn.to_string(),
        })?;

        state.tags.get(arn).cloned().ok_or_else(|| {
            from_code(
                codes::RESOURCE_NOT_FOUND,
                format!("resource {} not found", arn),
            )
        })
    }

    async fn describe_subnet_groups(&self, name: &str) -> Result<Vec<SubnetGroup>> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::DescribeSubnetGroups {
            name: name.to_string(),
        })?;

        let groups: Vec<SubnetGroup> = state
            .subnet_groups
            .iter()
            .filter(|g| g.name == name)
            .cloned()
            .collect();
        if groups.is_empty() {
            return Err(from_code(
                codes::DB_SUBNET_GROUP_NOT_FOUND,
                format!("DBSubnetGroup {} not found", name),
            ));
        }
        Ok(groups)
    }

    async fn create_subnet_group(&self, params: CreateSubnetGroupParams) -> Result<SubnetGroup> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::CreateSubnetGroup {
            name: params.name.clone(),
            subnet_ids: params.subnet_ids.clone(),
        })?;

        if state.subnet_groups.iter().any(|g| g.name == params.name) {
            return Err(from_code(
                codes::DB_SUBNET_GROUP_ALREADY_EXISTS,
                format!("DBSubnetGroup {} already exists", params.name),
            ));
        }

        let group = self.new_subnet_group(&params.name, params.description, params.subnet_ids);
        state.tags.insert(group.arn.clone(), params.tags);
        state.subnet_groups.push(group.clone());
        Ok(group)
    }

    async fn start_cluster(&self, identifier: &str) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::StartCluster {
            identifier: identifier.to_string(),
        })?;

        let stored = state
            .clusters
            .get_mut(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))?;
        if stored.cluster.status != "stopped" {
            return Err(from_code(
                codes::INVALID_DB_CLUSTER_STATE,
                format!("DBCluster {} is {}", identifier, stored.cluster.status),
            ));
        }
        stored.cluster.status = "starting".to_string();
        stored.describes_until_ready = self.ready_after.max(1);

        state
            .render_cluster(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))
    }

    async fn stop_cluster(&self, identifier: &str) -> Result<Cluster> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::StopCluster {
            identifier: identifier.to_string(),
        })?;

        let stored = state
            .clusters
            .get_mut(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))?;
        if stored.cluster.status != STATUS_AVAILABLE {
            return Err(from_code(
                codes::INVALID_DB_CLUSTER_STATE,
                format!("DBCluster {} is {}", identifier, stored.cluster.status),
            ));
        }
        // Stops settle immediately in the simulation.
        stored.cluster.status = "stopped".to_string();

        state
            .render_cluster(identifier)
            .ok_or_else(|| State::cluster_not_found(identifier))
    }
}

#[async_trait]
impl TagSearchApi for InMemoryClusterApi {
    async fn get_resources(
        &self,
        filters: &[TagFilter],
        resource_types: &[&str],
    ) -> Result<Vec<String>> {
        let mut state = self.state.lock().await;
        state.begin(UpstreamCall::GetResources {
            filters: filters.to_vec(),
        })?;

        if !resource_types.contains(&CLUSTER_RESOURCE_TYPE) {
            return Ok(Vec::new());
        }

        let matches = |tags: &TagSet| {
            filters.iter().all(|f| {
                tags.iter()
                    .any(|t| t.key == f.key && f.values.iter().any(|v| *v == t.value))
            })
        };

        let mut arns = Vec::new();
        for stored in state.clusters.values() {
            let cluster = &stored.cluster;
            let Some(tags) = state.tags.get(&cluster.arn) else {
                continue;
            };
            if matches(tags) {
                arns.push(cluster.arn.clone());
                arns.push(format!(
                    "arn:aws:rds:{}:{}:cluster:{}",
                    REGION, self.account_id, cluster.resource_id
                ));
            }
        }
        Ok(arns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tags::Tag;

    fn cluster_params(id: &str, group: &str) -> CreateClusterParams {
        CreateClusterParams {
            identifier: id.to_string(),
            engine: ENGINE.to_string(),
            subnet_group_name: group.to_string(),
            storage_encrypted: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cluster_becomes_available_after_describes() {
        let api = InMemoryClusterApi::new("123456789012").with_ready_after(2);
        api.insert_subnet_group("sg", vec!["a".into(), "b".into()]).await;

        let created = api.create_cluster(cluster_params("c", "sg")).await.unwrap();
        assert_eq!(created.status, "creating");

        assert_eq!(api.describe_cluster("c").await.unwrap().status, "creating");
        assert_eq!(api.describe_cluster("c").await.unwrap().status, STATUS_AVAILABLE);
    }

    #[tokio::test]
    async fn test_delete_cluster_with_members_fails() {
        let api = InMemoryClusterApi::new("123456789012");
        api.insert_subnet_group("sg", vec![]).await;
        api.create_cluster(cluster_params("c", "sg")).await.unwrap();
        api.create_instance(CreateInstanceParams {
            identifier: "c-1".into(),
            cluster_identifier: "c".into(),
            class: "db.r5.large".into(),
            engine: ENGINE.into(),
            ..Default::default()
        })
        .await
        .unwrap();

        let err = api
            .delete_cluster(DeleteClusterParams::new("c", false))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        api.delete_instance("c-1").await.unwrap();
        api.delete_cluster(DeleteClusterParams::new("c", false))
            .await
            .unwrap();
        assert_eq!(
            api.describe_cluster("c").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot_and_targeted() {
        let api = InMemoryClusterApi::new("123456789012");
        api.insert_cluster("a", TagSet::new()).await;
        api.insert_cluster("b", TagSet::new()).await;
        api.inject_failure(Operation::DescribeCluster, Some("b"), codes::SERVICE_UNAVAILABLE)
            .await;

        assert!(api.describe_cluster("a").await.is_ok());
        let err = api.describe_cluster("b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(api.describe_cluster("b").await.is_ok());
        assert_eq!(api.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_tag_search_returns_both_arn_forms() {
        let api = InMemoryClusterApi::new("123456789012");
        let tags: TagSet = vec![Tag::new("tenant-org", "acme")].into();
        let cluster = api.insert_cluster("orders", tags).await;
        api.insert_cluster("other", TagSet::new()).await;

        let arns = api
            .get_resources(&[TagFilter::new("tenant-org", "acme")], &[CLUSTER_RESOURCE_TYPE])
            .await
            .unwrap();

        assert_eq!(arns.len(), 2);
        assert_eq!(arns[0], cluster.arn);
        assert!(arns[1].ends_with(&format!("cluster:{}", cluster.resource_id)));
        assert!(cluster.resource_id.starts_with("cluster-"));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_cluster_leaves_source_untouched() {
        let api = InMemoryClusterApi::new("123456789012");
        let tags: TagSet = vec![Tag::new("tenant-org", "acme")].into();
        let original = api.insert_cluster("orders", tags).await;
        api.insert_cluster("billing", TagSet::new()).await;

        let err = api
            .modify_cluster(ModifyClusterParams {
                identifier: "orders".to_string(),
                backup_retention_period: Some(7),
                engine_version: Some("6.0.0".to_string()),
                security_group_ids: Some(vec!["sg-9".to_string()]),
                new_identifier: Some("billing".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let stored = api.describe_cluster("orders").await.unwrap();
        assert_eq!(stored.arn, original.arn);
        assert_eq!(stored.backup_retention_period, Some(1));
        assert_eq!(stored.engine_version.as_deref(), Some("5.0.0"));
        assert!(stored.security_group_ids.is_empty());

        let arns = api
            .get_resources(&[TagFilter::new("tenant-org", "acme")], &[CLUSTER_RESOURCE_TYPE])
            .await
            .unwrap();
        assert_eq!(arns[0], original.arn);
    }
}
