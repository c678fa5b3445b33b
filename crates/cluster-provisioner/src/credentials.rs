// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Role assumption and tenant-scoped client sessions.
//!
//! Every request obtains its own [`ScopedClients`] by assuming a role in the
//! target account with only the permissions that request needs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::upstream::{ClusterApi, InMemoryClusterApi, TagSearchApi};

/// Managed policy granting full cluster access.
pub const FULL_ACCESS_POLICY: &str = "arn:aws:iam::aws:policy/AmazonDocDBFullAccess";
/// Managed policy granting read-only cluster access.
pub const READ_ONLY_POLICY: &str = "arn:aws:iam::aws:policy/AmazonDocDBReadOnlyAccess";
/// Managed policy granting read-only tag search.
pub const TAG_READ_ONLY_POLICY: &str =
    "arn:aws:iam::aws:policy/ResourceGroupsandTagEditorReadOnlyAccess";

/// What to assume and with which permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Target account id
    pub account: String,
    /// Role to assume
    pub role_arn: String,
    /// External id presented when assuming
    pub external_id: Option<String>,
    /// Inline session policy (JSON) further restricting the role
    pub inline_policy: Option<String>,
    /// Managed policies attached to the session
    pub policy_arns: Vec<String>,
}

impl SessionParams {
    /// Parameters for assuming `role_name` in `account` with `policy_arns`.
    pub fn new(account: &str, role_name: &str, external_id: Option<String>, policy_arns: &[&str]) -> Self {
        Self {
            account: account.to_string(),
            role_arn: role_arn(account, role_name),
            external_id,
            inline_policy: None,
            policy_arns: policy_arns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Attach an inline session policy.
    pub fn with_inline_policy(mut self, policy: String) -> Self {
        self.inline_policy = Some(policy);
        self
    }
}

/// ARN of `role_name` in `account`.
pub fn role_arn(account: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{}:role/{}", account, role_name)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyDocument<'a> {
    version: &'static str,
    statement: Vec<StatementEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StatementEntry<'a> {
    effect: &'static str,
    action: &'a [&'a str],
    resource: &'static str,
}

/// Render a policy document allowing `actions` on every resource.
pub fn generate_policy(actions: &[&str]) -> Result<String> {
    debug!(actions = ?actions, "Generating policy document");

    let policy = PolicyDocument {
        version: "2012-10-17",
        statement: vec![StatementEntry {
            effect: "Allow",
            action: actions,
            resource: "*",
        }],
    };
    Ok(serde_json::to_string(&policy)?)
}

/// Clients bound to one assumed session.
#[derive(Clone)]
pub struct ScopedClients {
    /// Cluster-management API
    pub clusters: Arc<dyn ClusterApi>,
    /// Tag-search API
    pub tag_search: Arc<dyn TagSearchApi>,
}

/// Something that can assume a role and hand back scoped clients.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Assume the session described by `params`.
    async fn assume(&self, params: &SessionParams) -> Result<ScopedClients>;
}

/// Session provider backed by [`InMemoryClusterApi`], one backend per
/// account, created on first use.
pub struct LocalSessionProvider {
    ready_after: u32,
    backends: Mutex<HashMap<String, Arc<InMemoryClusterApi>>>,
}

impl Default for LocalSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSessionProvider {
    /// Create a provider whose backends make resources available on first
    /// describe.
    pub fn new() -> Self {
        Self {
            ready_after: 1,
            backends: Mutex::new(HashMap::new()),
        }
    }

    /// Backends report new resources as `creating` for this many describes.
    pub fn with_ready_after(mut self, describes: u32) -> Self {
        self.ready_after = describes;
        self
    }

    /// Backend for `account`, creating it if needed.
    pub async fn backend(&self, account: &str) -> Arc<InMemoryClusterApi> {
        let mut backends = self.backends.lock().await;
        backends
            .entry(account.to_string())
            .or_insert_with(|| {
                Arc::new(InMemoryClusterApi::new(account).with_ready_after(self.ready_after))
            })
            .clone()
    }
}

fn valid_account(account: &str) -> bool {
    account.len() == 12 && account.bytes().all(|b| b.is_ascii_digit())
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn assume(&self, params: &SessionParams) -> Result<ScopedClients> {
        if !valid_account(&params.account) {
            return Err(Error::Forbidden(format!(
                "cannot assume {}: invalid account id",
                params.role_arn
            )));
        }

        debug!(
            account = %params.account,
            role_arn = %params.role_arn,
            policies = ?params.policy_arns,
            "Assuming role"
        );

        let backend = self.backend(&params.account).await;
        Ok(ScopedClients {
            clusters: backend.clone(),
            tag_search: backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_session_params() {
        let params = SessionParams::new(
            "123456789012",
            "ManagementRole",
            Some("ext".to_string()),
            &[READ_ONLY_POLICY, TAG_READ_ONLY_POLICY],
        );

        assert_eq!(params.role_arn, "arn:aws:iam::123456789012:role/ManagementRole");
        assert_eq!(params.policy_arns.len(), 2);
        assert!(params.inline_policy.is_none());
    }

    #[test]
    fn test_generate_policy() {
        let json = generate_policy(&["rds:StartDBCluster", "rds:StopDBCluster"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": ["rds:StartDBCluster", "rds:StopDBCluster"],
                    "Resource": "*"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_local_provider_reuses_backend_per_account() {
        let provider = LocalSessionProvider::new();
        let a = provider.backend("123456789012").await;
        let b = provider.backend("123456789012").await;
        let c = provider.backend("210987654321").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_local_provider_rejects_bad_account() {
        let provider = LocalSessionProvider::new();
        let params = SessionParams::new("not-an-account", "Role", None, &[FULL_ACCESS_POLICY]);

        let err = provider.assume(&params).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
