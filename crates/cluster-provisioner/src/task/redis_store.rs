// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Redis-backed task tracker.
//!
//! Each task is stored as a JSON document under `<namespace>:task:<id>`.
//! Every write refreshes the key's TTL.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use super::{Task, TaskTracker, TaskUpdate};
use crate::error::{Error, Result};

/// Task tracker persisting tasks in Redis.
#[derive(Clone)]
pub struct RedisTaskTracker {
    conn: ConnectionManager,
    namespace: String,
    ttl: Duration,
}

impl RedisTaskTracker {
    /// Connect to `url`.
    pub async fn connect(url: &str, namespace: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!(namespace = %namespace, ttl_secs = ttl.as_secs(), "Connected to Redis task store");

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
            ttl,
        })
    }

    fn key(&self, id: &str) -> String {
        task_key(&self.namespace, id)
    }

    async fn load(&self, id: &str) -> Result<Option<Task>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(id)).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(Error::from))
            .transpose()
    }

    async fn store(&self, task: &Task) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(task)?;
        let _: () = conn
            .set_ex(self.key(&task.id), json, self.ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> Result<()> {
        let mut task = self
            .load(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {} not found", id)))?;
        if task.apply(update) {
            self.store(&task).await?;
        }
        Ok(())
    }
}

fn task_key(namespace: &str, id: &str) -> String {
    format!("{}:task:{}", namespace, id)
}

#[async_trait]
impl TaskTracker for RedisTaskTracker {
    async fn create(&self) -> Result<Task> {
        let task = Task::new();
        self.store(&task).await?;
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
        self.load(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_key() {
        assert_eq!(
            task_key("cluster-provisioner", "3f1c"),
            "cluster-provisioner:task:3f1c"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_roundtrip_against_redis() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let tracker = RedisTaskTracker::connect(&url, "cluster-provisioner-test", Duration::from_secs(60))
            .await
            .unwrap();

        let task = tracker.create().await.unwrap();
        tracker.start(&task.id).await.unwrap();
        tracker.complete(&task.id).await.unwrap();

        let stored = tracker.get(&task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, crate::task::TaskStatus::Completed);
    }
}
