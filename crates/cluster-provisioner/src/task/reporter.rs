// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Single-writer task reporter.
//!
//! Convergence work reports through a channel to one spawned loop per task,
//! so the tracker never sees concurrent writers for the same task. Tracker
//! errors are logged and never stop the loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::TaskTracker;

/// Events sent to the reporter loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A progress message
    Progress(String),
    /// Terminal failure
    Failed(String),
    /// Terminal success
    Completed,
}

/// Handle to a running reporter loop for one task.
pub struct TaskReporter {
    task_id: String,
    tx: mpsc::UnboundedSender<ReportEvent>,
    join: JoinHandle<()>,
}

impl TaskReporter {
    /// Start the task in `tracker` and spawn the loop forwarding events to it.
    pub fn spawn(tracker: Arc<dyn TaskTracker>, task_id: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let join = tokio::spawn(run(tracker, task_id.clone(), rx));
        Self { task_id, tx, join }
    }

    /// Id of the task being reported on.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Report a progress message.
    pub fn progress(&self, message: impl Into<String>) {
        self.send(ReportEvent::Progress(message.into()));
    }

    /// Report success and wait for the loop to finish.
    pub async fn complete(self) {
        self.send(ReportEvent::Completed);
        self.finish().await;
    }

    /// Report failure and wait for the loop to finish.
    pub async fn fail(self, reason: impl Into<String>) {
        self.send(ReportEvent::Failed(reason.into()));
        self.finish().await;
    }

    fn send(&self, event: ReportEvent) {
        if self.tx.send(event).is_err() {
            warn!(task_id = %self.task_id, "Task reporter already stopped");
        }
    }

    async fn finish(self) {
        let Self { task_id, tx, join } = self;
        drop(tx);
        if let Err(e) = join.await {
            error!(task_id = %task_id, error = %e, "Task reporter panicked");
        }
    }
}

async fn run(
    tracker: Arc<dyn TaskTracker>,
    task_id: String,
    mut rx: mpsc::UnboundedReceiver<ReportEvent>,
) {
    if let Err(e) = tracker.start(&task_id).await {
        error!(task_id = %task_id, error = %e, "Failed to start task");
    }

    while let Some(event) = rx.recv().await {
        match event {
            ReportEvent::Progress(message) => {
                info!(task_id = %task_id, message = %message, "Task progress");
                if let Err(e) = tracker.check_in(&task_id).await {
                    error!(task_id = %task_id, error = %e, "Failed to check in task");
                }
                if let Err(e) = tracker.log(&task_id, &message).await {
                    error!(task_id = %task_id, error = %e, "Failed to log task progress");
                }
            }
            ReportEvent::Failed(reason) => {
                warn!(task_id = %task_id, reason = %reason, "Task failed");
                if let Err(e) = tracker.fail(&task_id, &reason).await {
                    error!(task_id = %task_id, error = %e, "Failed to mark task failed");
                }
                return;
            }
            ReportEvent::Completed => {
                info!(task_id = %task_id, "Task completed");
                if let Err(e) = tracker.complete(&task_id).await {
                    error!(task_id = %task_id, error = %e, "Failed to mark task complete");
                }
                return;
            }
        }
    }

    // Sender dropped without a terminal event.
    warn!(task_id = %task_id, "Task reporter closed before the task finished");
    if let Err(e) = tracker
        .fail(&task_id, "task abandoned before completion")
        .await
    {
        error!(task_id = %task_id, error = %e, "Failed to mark task failed");
    }
}
