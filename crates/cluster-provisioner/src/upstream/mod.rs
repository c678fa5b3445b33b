// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Upstream module - the cluster-management API boundary.
//!
//! The orchestrator only talks to the traits defined here. The
//! [`InMemoryClusterApi`] backend simulates the provider for local runs and
//! tests.

pub mod errors;
pub mod memory;
mod traits;
pub mod types;

pub use memory::{InMemoryClusterApi, Operation, UpstreamCall};
pub use traits::*;
pub use types::*;
