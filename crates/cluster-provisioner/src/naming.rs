// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Deterministic names for resources derived from a cluster request.

use sha2::{Digest, Sha256};

/// Name of the shared subnet group for a tenant and subnet set.
///
/// The suffix is the first 32 hex characters of the SHA-256 digest of the
/// sorted, de-duplicated subnet ids joined with `,`, so the same set always
/// maps to the same group regardless of order.
pub fn subnet_group_name(prefix: &str, tenant: &str, subnet_ids: &[String]) -> String {
    let mut ids: Vec<&str> = subnet_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();

    let digest = Sha256::digest(ids.join(",").as_bytes());
    let hash = hex::encode(digest);

    format!("{}-{}-docdb-sg-{}", prefix, tenant, &hash[..32])
}

/// Identifier of the `ordinal`-th instance (1-based) of a cluster.
pub fn instance_identifier(cluster: &str, ordinal: u32) -> String {
    format!("{}-{}", cluster, ordinal)
}

/// Identifier of the snapshot taken when deleting a cluster.
pub fn final_snapshot_identifier(cluster: &str) -> String {
    format!("final-{}", cluster)
}
