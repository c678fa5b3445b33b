// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-process task tracker.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{Task, TaskTracker, TaskUpdate};
use crate::error::{Error, Result};

/// Retention of finished tasks when none is configured.
pub const DEFAULT_TASK_TTL: Duration = Duration::from_secs(86_400);

struct Entry {
    task: Task,
    /// When the task reached a terminal state
    finished_at: Option<Instant>,
}

/// Task tracker holding every task in memory. Tasks are lost on restart.
///
/// Finished tasks stay queryable for `ttl`; expired ones are dropped
/// whenever a task is created or read.
pub struct MemoryTaskTracker {
    tasks: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl Default for MemoryTaskTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_TTL)
    }
}

impl MemoryTaskTracker {
    /// Create an empty tracker keeping finished tasks for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of tasks currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// True when no task is held.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    fn evict_expired(&self, tasks: &mut HashMap<String, Entry>) {
        let before = tasks.len();
        tasks.retain(|_, entry| {
            entry
                .finished_at
                .is_none_or(|at| at.elapsed() < self.ttl)
        });
        let evicted = before - tasks.len();
        if evicted > 0 {
            debug!(evicted = evicted, remaining = tasks.len(), "Evicted expired tasks");
        }
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("task {} not found", id)))?;
        if entry.task.apply(update) && entry.task.status.is_terminal() {
            entry.finished_at = Some(Instant::now());
        }
        Ok(())
    }
}

#[async_trait]
impl TaskTracker for MemoryTaskTracker {
    async fn create(&self) -> Result<Task> {
        let task = Task::new();
        let mut tasks = self.tasks.write().await;
        self.evict_expired(&mut tasks);
        tasks.insert(
            task.id.clone(),
            Entry {
                task: task.clone(),
                finished_at: None,
            },
        );
        Ok(task)
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.update(id, TaskUpdate::Start).await
    }

    async fn check_in(&self, id: &str) -> Result<()> {
        self.update(id, TaskUpdate::CheckIn).await
    }

    async fn log(&self, id: &str, message: &str) -> Result<()> {
        self.update(id, TaskUpdate::Log(message.to_string())).await
    }

    async fn fail(&self, id: &str, reason: &str) -> Result<()> {
        self.update(id, TaskUpdate::Fail(reason.to_string())).await
    }

    async fn complete(&self, id: &str) -> Result<()> {
        self.update(id, TaskUpdate::Complete).await
    }

    async fn get(&self, id: &str) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        self.evict_expired(&mut tasks);
        Ok(tasks.get(id).map(|entry| entry.task.clone()))
    }
}
