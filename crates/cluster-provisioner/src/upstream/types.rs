// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Upstream resource models and call parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tags::TagSet;

/// Engine name for every cluster this service manages.
pub const ENGINE: &str = "docdb";

/// Status reported by clusters and instances once they are usable.
pub const STATUS_AVAILABLE: &str = "available";

/// Tag-search resource type filter for clusters.
pub const CLUSTER_RESOURCE_TYPE: &str = "rds:cluster";

/// A database cluster as reported by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cluster {
    /// Cluster identifier
    #[serde(rename = "DBClusterIdentifier")]
    pub identifier: String,
    /// Cluster ARN
    #[serde(rename = "DBClusterArn")]
    pub arn: String,
    /// Internal resource id (`cluster-...`)
    #[serde(rename = "DbClusterResourceId")]
    pub resource_id: String,
    /// Lifecycle status (`creating`, `available`, ...)
    pub status: String,
    /// Engine name
    pub engine: String,
    /// Engine version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    /// Writer endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Reader endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader_endpoint: Option<String>,
    /// Listener port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Storage encryption flag
    pub storage_encrypted: bool,
    /// Subnet group the cluster lives in
    #[serde(rename = "DBSubnetGroup", skip_serializing_if = "Option::is_none")]
    pub subnet_group: Option<String>,
    /// Backup retention in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_retention_period: Option<u32>,
    /// Master user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_username: Option<String>,
    /// VPC security groups
    #[serde(default, rename = "VpcSecurityGroupIds")]
    pub security_group_ids: Vec<String>,
    /// Member instances
    #[serde(default, rename = "DBClusterMembers")]
    pub members: Vec<ClusterMember>,
    /// Creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_create_time: Option<DateTime<Utc>>,
}

/// Membership of an instance in a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterMember {
    /// Instance identifier
    #[serde(rename = "DBInstanceIdentifier")]
    pub instance_identifier: String,
    /// True for the writer instance
    pub is_cluster_writer: bool,
    /// Failover priority
    pub promotion_tier: Option<u32>,
}

/// A database instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    /// Instance identifier
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,
    /// Parent cluster
    #[serde(rename = "DBClusterIdentifier")]
    pub cluster_identifier: String,
    /// Instance class, e.g. `db.r5.large`
    #[serde(rename = "DBInstanceClass")]
    pub class: String,
    /// Lifecycle status
    #[serde(rename = "DBInstanceStatus")]
    pub status: String,
    /// Engine name
    pub engine: String,
    /// Engine version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    /// Availability zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Failover priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_tier: Option<u32>,
    /// Instance endpoint address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// A subnet group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetGroup {
    /// Group name
    #[serde(rename = "DBSubnetGroupName")]
    pub name: String,
    /// Description
    #[serde(rename = "DBSubnetGroupDescription")]
    pub description: String,
    /// Group status
    pub subnet_group_status: String,
    /// Member subnets
    pub subnet_ids: Vec<String>,
    /// Group ARN
    #[serde(rename = "DBSubnetGroupArn")]
    pub arn: String,
}

// ============================================================================
// Call parameters
// ============================================================================

/// Parameters for creating a cluster.
#[derive(Debug, Clone, Default)]
pub struct CreateClusterParams {
    /// Cluster identifier
    pub identifier: String,
    /// Engine name (always [`ENGINE`])
    pub engine: String,
    /// Engine version
    pub engine_version: Option<String>,
    /// Backup retention in days
    pub backup_retention_period: Option<u32>,
    /// Master user name
    pub master_username: Option<String>,
    /// Master password
    pub master_user_password: Option<String>,
    /// Subnet group
    pub subnet_group_name: String,
    /// VPC security groups
    pub security_group_ids: Vec<String>,
    /// Storage encryption flag
    pub storage_encrypted: bool,
    /// Tags applied at creation
    pub tags: TagSet,
}

/// Parameters for creating an instance.
#[derive(Debug, Clone, Default)]
pub struct CreateInstanceParams {
    /// Instance identifier
    pub identifier: String,
    /// Parent cluster
    pub cluster_identifier: String,
    /// Instance class
    pub class: String,
    /// Engine name
    pub engine: String,
    /// Auto minor version upgrade flag
    pub auto_minor_version_upgrade: bool,
    /// Tags applied at creation
    pub tags: TagSet,
}

/// Parameters for modifying a cluster. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ModifyClusterParams {
    /// Cluster to modify
    pub identifier: String,
    /// Apply without waiting for the maintenance window
    pub apply_immediately: bool,
    /// Backup retention in days
    pub backup_retention_period: Option<u32>,
    /// Engine version
    pub engine_version: Option<String>,
    /// Master password
    pub master_user_password: Option<String>,
    /// Rename the cluster
    pub new_identifier: Option<String>,
    /// Replace VPC security groups
    pub security_group_ids: Option<Vec<String>>,
}

/// Parameters for modifying an instance.
#[derive(Debug, Clone, Default)]
pub struct ModifyInstanceParams {
    /// Instance to modify
    pub identifier: String,
    /// Apply without waiting for the maintenance window
    pub apply_immediately: bool,
    /// New instance class
    pub class: Option<String>,
}

/// Parameters for deleting a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteClusterParams {
    /// Cluster to delete
    pub identifier: String,
    /// Skip the final snapshot
    pub skip_final_snapshot: bool,
    /// Name of the final snapshot when one is taken
    pub final_snapshot_identifier: Option<String>,
}

impl DeleteClusterParams {
    /// Parameters for deleting `identifier`, taking a final snapshot named
    /// `final-<identifier>` when `snapshot` is set.
    pub fn new(identifier: &str, snapshot: bool) -> Self {
        Self {
            identifier: identifier.to_string(),
            skip_final_snapshot: !snapshot,
            final_snapshot_identifier: snapshot
                .then(|| crate::naming::final_snapshot_identifier(identifier)),
        }
    }
}

/// Parameters for creating a subnet group.
#[derive(Debug, Clone, Default)]
pub struct CreateSubnetGroupParams {
    /// Group name
    pub name: String,
    /// Description
    pub description: String,
    /// Member subnets
    pub subnet_ids: Vec<String>,
    /// Tags applied at creation
    pub tags: TagSet,
}

/// A tag-search filter: resources must carry `key` with one of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    /// Tag key
    pub key: String,
    /// Accepted values
    pub values: Vec<String>,
}

impl TagFilter {
    /// Filter on a single value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }
}
