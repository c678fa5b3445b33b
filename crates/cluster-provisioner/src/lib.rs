// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cluster Provisioner - Managed Document-Database Control Plane
//!
//! This crate provisions and manages document-database clusters (a cluster
//! plus its instance group) on behalf of tenant organizations. Requests
//! arrive over HTTP, are translated into upstream cluster-management calls
//! in the tenant's account, and long-running creations are tracked as tasks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           HTTP Clients                               │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 cluster-provisioner (This Crate)                     │
//! │  ┌────────────┐   ┌──────────────┐   ┌─────────────┐                │
//! │  │  Handlers  │──▶│ Orchestrator │──▶│ Convergence │──┐             │
//! │  └─────┬──────┘   └──────┬───────┘   └─────────────┘  │             │
//! │        │ assume          │ calls                       │ report      │
//! │        ▼                 ▼                             ▼             │
//! │  ┌────────────┐   ┌──────────────┐            ┌──────────────┐      │
//! │  │  Sessions  │   │  ClusterApi  │            │ TaskTracker  │      │
//! │  └────────────┘   └──────────────┘            └──────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # HTTP API (prefix `/v1/docdb`)
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/ping` | Liveness check |
//! | `GET` | `/version` | Build information |
//! | `GET` | `/metrics` | Prometheus metrics |
//! | `GET` | `/tasks/{id}` | Task status and event log |
//! | `POST` | `/{account}` | Create a cluster, returns `X-Task-Id` |
//! | `GET` | `/{account}` | List cluster names owned by the tenant |
//! | `GET` | `/{account}/{name}` | Cluster details and tags |
//! | `PUT` | `/{account}/{name}` | Modify a cluster |
//! | `PUT` | `/{account}/{name}/power` | Start or stop a cluster |
//! | `DELETE` | `/{account}/{name}` | Delete a cluster and its instances |
//!
//! # Task State Machine
//!
//! ```text
//!   ┌─────────┐  start  ┌─────────┐  complete  ┌───────────┐
//!   │ PENDING │────────▶│ RUNNING │───────────▶│ COMPLETED │
//!   └─────────┘         └────┬────┘            └───────────┘
//!                            │ fail
//!                            ▼
//!                       ┌────────┐
//!                       │ FAILED │
//!                       └────────┘
//! ```
//!
//! # Configuration
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PROVISIONER_ORG` | Yes | - | Tenant organization served |
//! | `PROVISIONER_LISTEN_ADDR` | No | `0.0.0.0:8080` | HTTP listen address |
//! | `PROVISIONER_ROLE_NAME` | No | `SpinupPlusXAManagementRole` | Role assumed in tenant accounts |
//! | `PROVISIONER_EXTERNAL_ID` | No | - | External id for role assumption |
//! | `PROVISIONER_RESOURCE_PREFIX` | No | `spinup` | Prefix for subnet group names |
//! | `PROVISIONER_CONVERGENCE_ATTEMPTS` | No | `10` | Convergence polling attempts |
//! | `PROVISIONER_CONVERGENCE_DELAY_SECS` | No | `10` | Delay between attempts |
//! | `PROVISIONER_REDIS_URL` | No | - | Redis task store (in-memory when unset) |
//! | `PROVISIONER_TASK_NAMESPACE` | No | `cluster-provisioner` | Redis key namespace |
//! | `PROVISIONER_TASK_TTL_SECS` | No | `86400` | Task retention |

#![deny(missing_docs)]

/// ARN parsing.
pub mod arn;

/// Server configuration loaded from environment variables.
pub mod config;

/// Role assumption and tenant-scoped client sessions.
pub mod credentials;

/// Error taxonomy and HTTP error rendering.
pub mod error;

/// HTTP request handlers.
pub mod handlers;

/// Prometheus metrics and request tracking.
pub mod metrics;

/// Deterministic resource names.
pub mod naming;

/// Cluster lifecycle orchestration and convergence polling.
pub mod orchestrator;

/// Bounded fixed-delay retry.
pub mod retry;

/// HTTP router and server.
pub mod server;

/// Tenant ownership tags.
pub mod tags;

/// Long-running task tracking.
pub mod task;

/// Request and response bodies.
pub mod types;

/// Upstream cluster-management API boundary.
pub mod upstream;

pub use error::{Error, ErrorKind, Result};
