// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Upstream trait definitions.
//!
//! Implementations translate vendor error codes through
//! [`super::errors::from_code`] before returning, so callers only ever see
//! the crate error taxonomy.

use async_trait::async_trait;

use super::types::*;
use crate::error::Result;
use crate::tags::TagSet;

/// Cluster-management control API of the upstream provider.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Create a cluster.
    async fn create_cluster(&self, params: CreateClusterParams) -> Result<Cluster>;

    /// Create an instance inside an existing cluster.
    async fn create_instance(&self, params: CreateInstanceParams) -> Result<Instance>;

    /// Modify cluster settings.
    async fn modify_cluster(&self, params: ModifyClusterParams) -> Result<Cluster>;

    /// Modify instance settings.
    async fn modify_instance(&self, params: ModifyInstanceParams) -> Result<Instance>;

    /// Delete a cluster. Members must already be gone.
    async fn delete_cluster(&self, params: DeleteClusterParams) -> Result<Cluster>;

    /// Delete an instance.
    async fn delete_instance(&self, identifier: &str) -> Result<Instance>;

    /// Describe a single cluster. Missing clusters are `NotFound`.
    async fn describe_cluster(&self, identifier: &str) -> Result<Cluster>;

    /// Describe every instance belonging to a cluster.
    async fn describe_instances(&self, cluster_identifier: &str) -> Result<Vec<Instance>>;

    /// Tags attached to the resource with `arn`.
    async fn list_tags(&self, arn: &str) -> Result<TagSet>;

    /// Subnet groups named `name`. An absent group is `NotFound`.
    async fn describe_subnet_groups(&self, name: &str) -> Result<Vec<SubnetGroup>>;

    /// Create a subnet group.
    async fn create_subnet_group(&self, params: CreateSubnetGroupParams) -> Result<SubnetGroup>;

    /// Start a stopped cluster.
    async fn start_cluster(&self, identifier: &str) -> Result<Cluster>;

    /// Stop a running cluster.
    async fn stop_cluster(&self, identifier: &str) -> Result<Cluster>;
}

/// Resource tag-search API.
#[async_trait]
pub trait TagSearchApi: Send + Sync {
    /// ARNs of resources of `resource_types` matching every filter.
    async fn get_resources(
        &self,
        filters: &[TagFilter],
        resource_types: &[&str],
    ) -> Result<Vec<String>>;
}
