// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for cluster-provisioner.

use std::net::SocketAddr;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Provisioner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tenant organization served by this deployment
    pub org: String,
    /// HTTP listen address
    pub listen_addr: SocketAddr,
    /// Name of the role assumed in tenant accounts
    pub role_name: String,
    /// External id passed along when assuming roles
    pub external_id: Option<String>,
    /// Prefix for service-owned resource names (subnet groups)
    pub resource_prefix: String,
    /// Maximum convergence polling attempts after a create
    pub convergence_attempts: u32,
    /// Fixed delay between convergence attempts
    pub convergence_delay: Duration,
    /// Redis URL for the task store; in-memory when unset
    pub redis_url: Option<String>,
    /// Key namespace for stored tasks
    pub task_namespace: String,
    /// How long finished tasks stay queryable
    pub task_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let org = lookup("PROVISIONER_ORG")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar("PROVISIONER_ORG"))?;

        let listen_addr = lookup("PROVISIONER_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let listen_addr = listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(listen_addr))?;

        let role_name = lookup("PROVISIONER_ROLE_NAME")
            .unwrap_or_else(|| "SpinupPlusXAManagementRole".to_string());

        let external_id = lookup("PROVISIONER_EXTERNAL_ID").filter(|v| !v.is_empty());

        let resource_prefix =
            lookup("PROVISIONER_RESOURCE_PREFIX").unwrap_or_else(|| "spinup".to_string());

        let convergence_attempts =
            parse_positive(&lookup, "PROVISIONER_CONVERGENCE_ATTEMPTS", 10)? as u32;
        let convergence_delay =
            Duration::from_secs(parse_positive(&lookup, "PROVISIONER_CONVERGENCE_DELAY_SECS", 10)?);

        let redis_url = lookup("PROVISIONER_REDIS_URL").filter(|v| !v.is_empty());

        let task_namespace = lookup("PROVISIONER_TASK_NAMESPACE")
            .unwrap_or_else(|| "cluster-provisioner".to_string());

        let task_ttl =
            Duration::from_secs(parse_positive(&lookup, "PROVISIONER_TASK_TTL_SECS", 86_400)?);

        Ok(Self {
            org,
            listen_addr,
            role_name,
            external_id,
            resource_prefix,
            convergence_attempts,
            convergence_delay,
            redis_url,
            task_namespace,
            task_ttl,
        })
    }

    /// Retry policy for post-create convergence polling.
    pub fn convergence_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.convergence_attempts, self.convergence_delay)
    }
}

fn parse_positive<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 && n <= u32::MAX as u64 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { var, value }),
        },
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// The listen address is invalid.
    #[error("Invalid listen address: {0}")]
    InvalidAddr(String),
    /// A numeric variable is not a positive integer.
    #[error("Invalid value for {var}: {value} (expected a positive integer)")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}
