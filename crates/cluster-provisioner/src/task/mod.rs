// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Task module - progress tracking for long-running operations.
//!
//! A task is allocated when a create request is accepted and driven to a
//! terminal state by the convergence reporter. The same state machine
//! ([`Task::apply`]) backs every [`TaskTracker`] implementation.

pub mod memory;
pub mod redis_store;
pub mod reporter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

pub use memory::MemoryTaskTracker;
pub use redis_store::RedisTaskTracker;
pub use reporter::TaskReporter;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Allocated, work not started yet
    Pending,
    /// Work in progress
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// True for completed and failed.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// A single timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// When the event was recorded
    pub at: DateTime<Utc>,
    /// Event text
    pub message: String,
}

/// A tracked long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque task id
    pub id: String,
    /// Current status
    pub status: TaskStatus,
    /// Allocation time
    pub created_at: DateTime<Utc>,
    /// Last sign of life from the worker
    pub checkin_at: Option<DateTime<Utc>>,
    /// When a terminal state was reached
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure reason for failed tasks
    pub failure: Option<String>,
    /// Progress log
    pub events: Vec<TaskEvent>,
}

/// A state change requested by a task writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    /// Pending to running
    Start,
    /// Refresh the check-in timestamp
    CheckIn,
    /// Append a progress message
    Log(String),
    /// Terminal failure with a reason
    Fail(String),
    /// Terminal success
    Complete,
}

impl Task {
    /// A fresh pending task with a random id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            checkin_at: None,
            completed_at: None,
            failure: None,
            events: Vec::new(),
        }
    }

    /// Apply an update. Returns false, leaving the task untouched, when the
    /// task is already terminal.
    pub fn apply(&mut self, update: TaskUpdate) -> bool {
        if self.status.is_terminal() {
            warn!(task_id = %self.id, status = ?self.status, update = ?update, "Ignoring update to finished task");
            return false;
        }

        let now = Utc::now();
        match update {
            TaskUpdate::Start => {
                self.status = TaskStatus::Running;
                self.checkin_at = Some(now);
            }
            TaskUpdate::CheckIn => self.checkin_at = Some(now),
            TaskUpdate::Log(message) => self.events.push(TaskEvent { at: now, message }),
            TaskUpdate::Fail(reason) => {
                self.status = TaskStatus::Failed;
                self.completed_at = Some(now);
                self.events.push(TaskEvent {
                    at: now,
                    message: reason.clone(),
                });
                self.failure = Some(reason);
            }
            TaskUpdate::Complete => {
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
            }
        }
        true
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Store of task state keyed by task id.
///
/// Updates to unknown ids are `NotFound`; updates to finished tasks are
/// ignored.
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// Allocate a new pending task.
    async fn create(&self) -> Result<Task>;

    /// Mark a task as running.
    async fn start(&self, id: &str) -> Result<()>;

    /// Refresh a task's check-in timestamp.
    async fn check_in(&self, id: &str) -> Result<()>;

    /// Append a progress message.
    async fn log(&self, id: &str, message: &str) -> Result<()>;

    /// Mark a task failed.
    async fn fail(&self, id: &str, reason: &str) -> Result<()>;

    /// Mark a task completed.
    async fn complete(&self, id: &str) -> Result<()>;

    /// Current state of a task.
    async fn get(&self, id: &str) -> Result<Option<Task>>;
}
