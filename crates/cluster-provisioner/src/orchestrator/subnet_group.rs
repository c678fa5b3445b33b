// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Idempotent subnet group ensure.

use tracing::{debug, info};

use super::ClusterOrchestrator;
use crate::error::{Error, ErrorKind, Result};
use crate::tags::TagSet;
use crate::upstream::CreateSubnetGroupParams;

impl ClusterOrchestrator {
    /// Make sure exactly one subnet group named `name` exists, creating it
    /// with `subnet_ids` and `tags` when absent.
    ///
    /// Losing a creation race to a concurrent request counts as success.
    pub async fn ensure_subnet_group(
        &self,
        name: &str,
        subnet_ids: &[String],
        tags: &TagSet,
    ) -> Result<()> {
        if self.existing_subnet_groups(name).await? == 1 {
            info!(subnet_group = %name, "Subnet group already exists, reusing it");
            return Ok(());
        }

        info!(subnet_group = %name, subnets = ?subnet_ids, "Creating subnet group");
        let created = self
            .clients
            .clusters
            .create_subnet_group(CreateSubnetGroupParams {
                name: name.to_string(),
                description: name.to_string(),
                subnet_ids: subnet_ids.to_vec(),
                tags: tags.clone(),
            })
            .await;

        match created {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::Conflict => {
                if self.existing_subnet_groups(name).await? == 1 {
                    info!(subnet_group = %name, "Subnet group was created concurrently, reusing it");
                    Ok(())
                } else {
                    Err(e.with_context(format!("failed to create subnet group {}", name)))
                }
            }
            Err(e) => Err(e.with_context(format!("failed to create subnet group {}", name))),
        }
    }

    /// Number of subnet groups named `name`: 0 or 1. More than one is an
    /// error.
    async fn existing_subnet_groups(&self, name: &str) -> Result<usize> {
        match self.clients.clusters.describe_subnet_groups(name).await {
            Ok(groups) if groups.len() > 1 => Err(Error::Internal(format!(
                "unexpected number of matching subnet groups: {}",
                groups.len()
            ))),
            Ok(groups) => Ok(groups.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(subnet_group = %name, "Subnet group not found");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
