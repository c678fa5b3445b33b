// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Post-create convergence polling.
//!
//! After a create returns, a detached task polls the cluster and its
//! instances until all of them report `available`, the retry policy runs out,
//! or the service shuts down. Progress goes to the task tracker through a
//! [`TaskReporter`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::SessionRefresh;
use crate::credentials::ScopedClients;
use crate::error::{Error, Result};
use crate::metrics;
use crate::retry::{RetryPolicy, retry};
use crate::task::{TaskReporter, TaskTracker};
use crate::upstream::STATUS_AVAILABLE;

/// How a convergence task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceOutcome {
    /// Cluster and all instances are available
    Available,
    /// Attempts ran out; carries the failure reason
    Failed(String),
    /// Cancelled before convergence
    Cancelled,
}

/// Handle to a detached convergence task.
pub struct ConvergenceHandle {
    cancel: CancellationToken,
    join: JoinHandle<ConvergenceOutcome>,
}

impl ConvergenceHandle {
    /// Ask the task to stop. The task is marked failed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to end.
    pub async fn wait(self) -> ConvergenceOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Convergence task panicked");
                ConvergenceOutcome::Failed(format!("convergence task panicked: {}", e))
            }
        }
    }

    /// Let the task run on its own.
    pub fn detach(self) {}
}

/// Everything a convergence task needs, detached from the request.
pub(super) struct ConvergenceWorker {
    pub(super) cluster: String,
    pub(super) clients: ScopedClients,
    pub(super) session: Option<SessionRefresh>,
    pub(super) policy: RetryPolicy,
}

impl ConvergenceWorker {
    /// One polling attempt. Any error means "not there yet".
    async fn check(&self, attempt: u32, reporter: &TaskReporter) -> Result<()> {
        let cl = &self.cluster;
        reporter.progress(format!(
            "checking if cluster {} is available (attempt {}/{})",
            cl, attempt, self.policy.max_attempts
        ));

        let clients = match &self.session {
            Some(refresh) => refresh.assume().await.inspect_err(|e| {
                reporter.progress(format!("unable to refresh orchestrator session: {}", e.message()));
            })?,
            None => self.clients.clone(),
        };

        let cluster = clients
            .clusters
            .describe_cluster(cl)
            .await
            .inspect_err(|e| {
                reporter.progress(format!(
                    "got error checking if cluster {} is available: {}",
                    cl,
                    e.message()
                ));
            })?;
        if cluster.status != STATUS_AVAILABLE {
            reporter.progress(format!(
                "cluster {} is not yet available ({})",
                cl, cluster.status
            ));
            return Err(Error::Internal(format!("cluster {} not yet available", cl)));
        }

        let instances = clients
            .clusters
            .describe_instances(cl)
            .await
            .inspect_err(|e| {
                reporter.progress(format!(
                    "got error describing instances for {}: {}",
                    cl,
                    e.message()
                ));
            })?;
        if instances.is_empty() {
            reporter.progress(format!("cluster {} doesn't have any instances", cl));
            return Err(Error::Internal(format!("cluster {} has no instances", cl)));
        }
        if instances.iter().any(|i| i.status != STATUS_AVAILABLE) {
            reporter.progress(format!("not all instances in cluster {} are available", cl));
            return Err(Error::Internal(format!(
                "not all instances in cluster {} are available",
                cl
            )));
        }

        reporter.progress(format!("cluster {} is available", cl));
        Ok(())
    }
}

/// Spawn the convergence task under a child of `shutdown`.
pub(super) fn spawn(
    worker: ConvergenceWorker,
    tracker: Arc<dyn TaskTracker>,
    task_id: String,
    shutdown: &CancellationToken,
) -> ConvergenceHandle {
    let cancel = shutdown.child_token();
    let token = cancel.clone();

    let join = tokio::spawn(async move {
        let reporter = TaskReporter::spawn(tracker, task_id);
        reporter.progress(format!("requested creation of cluster {}", worker.cluster));

        let result = tokio::select! {
            biased;

            _ = token.cancelled() => None,

            res = retry(worker.policy, |_| true, |attempt| worker.check(attempt, &reporter)) => Some(res),
        };

        match result {
            Some(Ok(())) => {
                reporter.complete().await;
                metrics::record_convergence("available");
                ConvergenceOutcome::Available
            }
            Some(Err(e)) => {
                let reason = format!(
                    "failed to create cluster {}, timeout waiting to become available: {}",
                    worker.cluster,
                    e.message()
                );
                reporter.fail(reason.clone()).await;
                metrics::record_convergence("failed");
                ConvergenceOutcome::Failed(reason)
            }
            None => {
                reporter
                    .fail(format!(
                        "waiting for cluster {} to become available was cancelled",
                        worker.cluster
                    ))
                    .await;
                metrics::record_convergence("cancelled");
                ConvergenceOutcome::Cancelled
            }
        }
    });

    ConvergenceHandle { cancel, join }
}
