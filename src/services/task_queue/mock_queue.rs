use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{QueueError, TaskQueue};
use crate::models::scheduled_task::ScheduledTask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Delete(String),
    Create(String),
}

/// In-memory queue that records every call for assertions in tests.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MockTaskQueue {
    pub pending: Mutex<HashMap<String, ScheduledTask>>,
    pub calls: Mutex<Vec<QueueCall>>,
    pub fail_delete: bool,
    pub fail_create: bool,
    /// Simulates another request creating the same name between our delete
    /// and create.
    pub concurrent_create: bool,
}

#[allow(dead_code)]
impl MockTaskQueue {
    pub fn with_pending(task: ScheduledTask) -> Self {
        let queue = Self::default();
        queue
            .pending
            .lock()
            .unwrap()
            .insert(task.name.clone(), task);
        queue
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending_tasks(&self) -> Vec<ScheduledTask> {
        self.pending.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl TaskQueue for MockTaskQueue {
    async fn delete_task(&self, name: &str) -> Result<(), QueueError> {
        self.calls
            .lock()
            .unwrap()
            .push(QueueCall::Delete(name.to_string()));
        if self.fail_delete {
            return Err(QueueError::Unavailable("mock delete failure".into()));
        }
        let removed = self.pending.lock().unwrap().remove(name);
        // Leave a window between delete and create for concurrent callers.
        tokio::task::yield_now().await;
        match removed {
            Some(_) => Ok(()),
            None => Err(QueueError::NotFound(name.to_string())),
        }
    }

    async fn create_task(&self, task: &ScheduledTask) -> Result<(), QueueError> {
        self.calls
            .lock()
            .unwrap()
            .push(QueueCall::Create(task.name.clone()));
        if self.fail_create {
            return Err(QueueError::Unavailable("mock create failure".into()));
        }
        let mut pending = self.pending.lock().unwrap();
        if self.concurrent_create {
            pending.insert(task.name.clone(), task.clone());
            return Err(QueueError::AlreadyExists(task.name.clone()));
        }
        if pending.contains_key(&task.name) {
            return Err(QueueError::AlreadyExists(task.name.clone()));
        }
        pending.insert(task.name.clone(), task.clone());
        Ok(())
    }
}
