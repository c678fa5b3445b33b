// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request and response bodies of the HTTP API.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tags::TagSet;
use crate::upstream::{Cluster, Instance};

/// Upper bound on instances per cluster.
pub const MAX_INSTANCE_COUNT: u32 = 16;

fn default_instance_count() -> u32 {
    1
}

/// Desired cluster, as submitted on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterSpec {
    /// Cluster identifier
    #[serde(rename = "DBClusterIdentifier")]
    pub cluster_identifier: String,
    /// Number of instances to create
    #[serde(default = "default_instance_count")]
    pub instance_count: u32,
    /// Instance class for every instance
    #[serde(rename = "DBInstanceClass")]
    pub instance_class: String,
    /// Engine version
    #[serde(default)]
    pub engine_version: Option<String>,
    /// Backup retention in days
    #[serde(default)]
    pub backup_retention_period: Option<u32>,
    /// Master user name
    #[serde(default)]
    pub master_username: Option<String>,
    /// Master password
    #[serde(default, skip_serializing)]
    pub master_user_password: Option<String>,
    /// Subnets the cluster may use
    #[serde(default)]
    pub subnet_ids: Option<Vec<String>>,
    /// VPC security groups
    #[serde(default)]
    pub vpc_security_group_ids: Vec<String>,
    /// Caller tags
    #[serde(default)]
    pub tags: TagSet,
}

impl ClusterSpec {
    /// Reject specs that cannot be provisioned. No upstream call is made for
    /// an invalid spec.
    pub fn validate(&self) -> Result<()> {
        let subnets = self
            .subnet_ids
            .as_ref()
            .ok_or_else(|| Error::BadRequest("SubnetIds is a required field".to_string()))?;
        if subnets.len() < 2 {
            return Err(Error::BadRequest(
                "At least 2 SubnetIds are required".to_string(),
            ));
        }
        if self.cluster_identifier.trim().is_empty() {
            return Err(Error::BadRequest(
                "DBClusterIdentifier is a required field".to_string(),
            ));
        }
        if self.instance_class.trim().is_empty() {
            return Err(Error::BadRequest(
                "DBInstanceClass is a required field".to_string(),
            ));
        }
        if self.instance_count == 0 {
            return Err(Error::BadRequest(
                "InstanceCount must be at least 1".to_string(),
            ));
        }
        if self.instance_count > MAX_INSTANCE_COUNT {
            return Err(Error::BadRequest(format!(
                "InstanceCount must be at most {}",
                MAX_INSTANCE_COUNT
            )));
        }
        Ok(())
    }

    /// Subnet ids, empty when absent.
    pub fn subnets(&self) -> &[String] {
        self.subnet_ids.as_deref().unwrap_or_default()
    }
}

/// Changes requested on modify. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyClusterRequest {
    /// Backup retention in days
    #[serde(default)]
    pub backup_retention_period: Option<u32>,
    /// Engine version
    #[serde(default)]
    pub engine_version: Option<String>,
    /// Master password
    #[serde(default, skip_serializing)]
    pub master_user_password: Option<String>,
    /// Rename the cluster
    #[serde(default, rename = "NewDBClusterIdentifier")]
    pub new_cluster_identifier: Option<String>,
    /// Replace VPC security groups
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    /// Resize every instance
    #[serde(default, rename = "DBInstanceClass")]
    pub instance_class: Option<String>,
}

/// Response to an accepted create.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateClusterResponse {
    /// The cluster as returned by the create call
    pub cluster: Cluster,
    /// Instances as returned by their create calls
    pub instances: Vec<Instance>,
}

/// Cluster details with its tags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterDetails {
    /// The cluster
    pub cluster: Cluster,
    /// Tags attached to the cluster
    pub tags: TagSet,
}

/// Response to a modify.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyClusterResponse {
    /// The cluster after modification
    pub cluster: Cluster,
    /// Instances that were modified
    pub instances: Vec<Instance>,
}

/// Requested power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Start a stopped cluster
    Start,
    /// Stop a running cluster
    Stop,
}

impl FromStr for PowerState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(PowerState::Start),
            "stop" => Ok(PowerState::Stop),
            other => Err(Error::BadRequest(format!("unknown power state {:?}", other))),
        }
    }
}

/// Body of a power state change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerStateRequest {
    /// `start` or `stop`
    #[serde(default)]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn spec(subnets: Option<&[&str]>) -> ClusterSpec {
        ClusterSpec {
            cluster_identifier: "orders".into(),
            instance_count: 2,
            instance_class: "db.r5.large".into(),
            subnet_ids: subnets.map(|s| s.iter().map(|x| x.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_subnets() {
        let err = spec(None).validate().unwrap_err();
        assert_eq!(err.message(), "SubnetIds is a required field");

        let err = spec(Some(&["subnet-a"])).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "At least 2 SubnetIds are required");

        assert!(spec(Some(&["subnet-a", "subnet-b"])).validate().is_ok());
    }

    #[test]
    fn test_validate_required_fields() {
        let mut s = spec(Some(&["a", "b"]));
        s.cluster_identifier.clear();
        assert_eq!(s.validate().unwrap_err().kind(), ErrorKind::BadRequest);

        let mut s = spec(Some(&["a", "b"]));
        s.instance_count = 0;
        assert_eq!(s.validate().unwrap_err().kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_validate_instance_count_bound() {
        let mut s = spec(Some(&["a", "b"]));
        s.instance_count = MAX_INSTANCE_COUNT;
        assert!(s.validate().is_ok());

        s.instance_count = MAX_INSTANCE_COUNT + 1;
        let err = s.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "InstanceCount must be at most 16");

        s.instance_count = u32::MAX;
        assert_eq!(s.validate().unwrap_err().kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_deserialize_spec() {
        let s: ClusterSpec = serde_json::from_value(serde_json::json!({
            "DBClusterIdentifier": "orders",
            "DBInstanceClass": "db.r5.large",
            "SubnetIds": ["subnet-a", "subnet-b"],
            "Tags": [{"Key": "env", "Value": "prod"}]
        }))
        .unwrap();

        assert_eq!(s.instance_count, 1);
        assert_eq!(s.subnets().len(), 2);
        assert_eq!(s.tags.get("env"), Some("prod"));
    }

    #[test]
    fn test_power_state_parse() {
        assert_eq!("start".parse::<PowerState>().unwrap(), PowerState::Start);
        assert_eq!("STOP".parse::<PowerState>().unwrap(), PowerState::Stop);
        assert_eq!("Start".parse::<PowerState>().unwrap(), PowerState::Start);

        let err = "pause".parse::<PowerState>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "unknown power state \"pause\"");
    }
}
