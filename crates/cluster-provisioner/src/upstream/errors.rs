// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Vendor error code normalization.
//!
//! This is the only place upstream error codes are interpreted.

use crate::error::{Error, ErrorKind};

/// Vendor error codes raised by the cluster-management API.
pub mod codes {
    #![allow(missing_docs)]

    pub const FORBIDDEN: &str = "Forbidden";
    pub const LIMIT_EXCEEDED: &str = "LimitExceeded";
    pub const NOT_FOUND: &str = "NotFound";
    pub const SERVICE_UNAVAILABLE: &str = "ServiceUnavailable";

    pub const DB_CLUSTER_QUOTA_EXCEEDED: &str = "DBClusterQuotaExceededFault";
    pub const DB_PARAMETER_GROUP_QUOTA_EXCEEDED: &str = "DBParameterGroupQuotaExceeded";
    pub const DB_SUBNET_GROUP_QUOTA_EXCEEDED: &str = "DBSubnetGroupQuotaExceeded";
    pub const DB_SUBNET_QUOTA_EXCEEDED: &str = "DBSubnetQuotaExceededFault";
    pub const EVENT_SUBSCRIPTION_QUOTA_EXCEEDED: &str = "EventSubscriptionQuotaExceeded";
    pub const GLOBAL_CLUSTER_QUOTA_EXCEEDED: &str = "GlobalClusterQuotaExceededFault";
    pub const INSTANCE_QUOTA_EXCEEDED: &str = "InstanceQuotaExceeded";
    pub const SHARED_SNAPSHOT_QUOTA_EXCEEDED: &str = "SharedSnapshotQuotaExceeded";
    pub const SNAPSHOT_QUOTA_EXCEEDED: &str = "SnapshotQuotaExceeded";
    pub const STORAGE_QUOTA_EXCEEDED: &str = "StorageQuotaExceeded";

    pub const DB_CLUSTER_ALREADY_EXISTS: &str = "DBClusterAlreadyExistsFault";
    pub const DB_CLUSTER_SNAPSHOT_ALREADY_EXISTS: &str = "DBClusterSnapshotAlreadyExistsFault";
    pub const DB_INSTANCE_ALREADY_EXISTS: &str = "DBInstanceAlreadyExists";
    pub const DB_PARAMETER_GROUP_ALREADY_EXISTS: &str = "DBParameterGroupAlreadyExists";
    pub const DB_SNAPSHOT_ALREADY_EXISTS: &str = "DBSnapshotAlreadyExists";
    pub const DB_SUBNET_GROUP_ALREADY_EXISTS: &str = "DBSubnetGroupAlreadyExists";
    pub const GLOBAL_CLUSTER_ALREADY_EXISTS: &str = "GlobalClusterAlreadyExistsFault";
    pub const SUBNET_ALREADY_IN_USE: &str = "SubnetAlreadyInUse";
    pub const SUBSCRIPTION_ALREADY_EXISTS: &str = "SubscriptionAlreadyExist";
    pub const DB_UPGRADE_DEPENDENCY_FAILURE: &str = "DBUpgradeDependencyFailure";

    pub const DB_CLUSTER_NOT_FOUND: &str = "DBClusterNotFoundFault";
    pub const DB_CLUSTER_SNAPSHOT_NOT_FOUND: &str = "DBClusterSnapshotNotFoundFault";
    pub const DB_INSTANCE_NOT_FOUND: &str = "DBInstanceNotFound";
    pub const DB_SNAPSHOT_NOT_FOUND: &str = "DBSnapshotNotFound";
    pub const DB_SUBNET_GROUP_NOT_FOUND: &str = "DBSubnetGroupNotFoundFault";
    pub const GLOBAL_CLUSTER_NOT_FOUND: &str = "GlobalClusterNotFoundFault";
    pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundFault";

    pub const INSUFFICIENT_DB_CLUSTER_CAPACITY: &str = "InsufficientDBClusterCapacityFault";
    pub const INSUFFICIENT_DB_INSTANCE_CAPACITY: &str = "InsufficientDBInstanceCapacity";
    pub const INSUFFICIENT_STORAGE_CLUSTER_CAPACITY: &str = "InsufficientStorageClusterCapacity";
    pub const INVALID_DB_CLUSTER_SNAPSHOT_STATE: &str = "InvalidDBClusterSnapshotStateFault";
    pub const INVALID_DB_CLUSTER_STATE: &str = "InvalidDBClusterStateFault";
    pub const INVALID_DB_INSTANCE_STATE: &str = "InvalidDBInstanceState";
    pub const INVALID_DB_PARAMETER_GROUP_STATE: &str = "InvalidDBParameterGroupState";
    pub const INVALID_DB_SECURITY_GROUP_STATE: &str = "InvalidDBSecurityGroupState";
    pub const INVALID_DB_SNAPSHOT_STATE: &str = "InvalidDBSnapshotState";
    pub const INVALID_DB_SUBNET_GROUP_STATE: &str = "InvalidDBSubnetGroupStateFault";
    pub const INVALID_DB_SUBNET_STATE: &str = "InvalidDBSubnetStateFault";
    pub const INVALID_EVENT_SUBSCRIPTION_STATE: &str = "InvalidEventSubscriptionState";
    pub const INVALID_GLOBAL_CLUSTER_STATE: &str = "InvalidGlobalClusterStateFault";
    pub const INVALID_RESTORE: &str = "InvalidRestoreFault";
    pub const INVALID_SUBNET: &str = "InvalidSubnet";
    pub const INVALID_VPC_NETWORK_STATE: &str = "InvalidVPCNetworkStateFault";
}

/// Error kind for a vendor error code.
///
/// Unknown codes are treated as caller mistakes.
pub fn kind_for_code(code: &str) -> ErrorKind {
    use codes::*;

    match code {
        FORBIDDEN => ErrorKind::Forbidden,

        DB_CLUSTER_QUOTA_EXCEEDED
        | DB_PARAMETER_GROUP_QUOTA_EXCEEDED
        | DB_SUBNET_GROUP_QUOTA_EXCEEDED
        | DB_SUBNET_QUOTA_EXCEEDED
        | EVENT_SUBSCRIPTION_QUOTA_EXCEEDED
        | GLOBAL_CLUSTER_QUOTA_EXCEEDED
        | INSTANCE_QUOTA_EXCEEDED
        | SHARED_SNAPSHOT_QUOTA_EXCEEDED
        | SNAPSHOT_QUOTA_EXCEEDED
        | STORAGE_QUOTA_EXCEEDED
        | LIMIT_EXCEEDED => ErrorKind::LimitExceeded,

        DB_CLUSTER_ALREADY_EXISTS
        | DB_CLUSTER_SNAPSHOT_ALREADY_EXISTS
        | DB_INSTANCE_ALREADY_EXISTS
        | DB_PARAMETER_GROUP_ALREADY_EXISTS
        | DB_SNAPSHOT_ALREADY_EXISTS
        | DB_SUBNET_GROUP_ALREADY_EXISTS
        | GLOBAL_CLUSTER_ALREADY_EXISTS
        | SUBNET_ALREADY_IN_USE
        | SUBSCRIPTION_ALREADY_EXISTS
        | DB_UPGRADE_DEPENDENCY_FAILURE => ErrorKind::Conflict,

        DB_CLUSTER_NOT_FOUND
        | DB_CLUSTER_SNAPSHOT_NOT_FOUND
        | DB_INSTANCE_NOT_FOUND
        | DB_SNAPSHOT_NOT_FOUND
        | DB_SUBNET_GROUP_NOT_FOUND
        | GLOBAL_CLUSTER_NOT_FOUND
        | RESOURCE_NOT_FOUND
        | NOT_FOUND => ErrorKind::NotFound,

        INSUFFICIENT_DB_CLUSTER_CAPACITY
        | INSUFFICIENT_DB_INSTANCE_CAPACITY
        | INSUFFICIENT_STORAGE_CLUSTER_CAPACITY
        | INVALID_DB_CLUSTER_SNAPSHOT_STATE
        | INVALID_DB_CLUSTER_STATE
        | INVALID_DB_INSTANCE_STATE
        | INVALID_DB_PARAMETER_GROUP_STATE
        | INVALID_DB_SECURITY_GROUP_STATE
        | INVALID_DB_SNAPSHOT_STATE
        | INVALID_DB_SUBNET_GROUP_STATE
        | INVALID_DB_SUBNET_STATE
        | INVALID_EVENT_SUBSCRIPTION_STATE
        | INVALID_GLOBAL_CLUSTER_STATE
        | INVALID_RESTORE
        | INVALID_SUBNET
        | INVALID_VPC_NETWORK_STATE => ErrorKind::Internal,

        SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,

        _ => ErrorKind::BadRequest,
    }
}

/// Build a crate error from a vendor code and message.
pub fn from_code(code: &str, message: impl std::fmt::Display) -> Error {
    Error::new(kind_for_code(code), format!("{}: {}", code, message))
}
