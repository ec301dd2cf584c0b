use async_trait::async_trait;
use thiserror::Error;

use crate::models::scheduled_task::ScheduledTask;
use crate::services::gcp_auth::AuthError;

mod cloud_tasks;
#[cfg(test)]
mod mock_queue;

pub use cloud_tasks::{CloudTasksQueue, CLOUD_TASKS_BASE_URL};
#[cfg(test)]
pub use mock_queue::{MockTaskQueue, QueueCall};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task already exists: {0}")]
    AlreadyExists(String),
    #[error("task queue request failed: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for QueueError {
    fn from(err: reqwest::Error) -> Self {
        QueueError::Unavailable(err.to_string())
    }
}

impl From<AuthError> for QueueError {
    fn from(err: AuthError) -> Self {
        QueueError::Unavailable(format!("authentication failed: {}", err))
    }
}

/// Named, delayed HTTP task storage.
///
/// Names are unique within the queue: `create_task` with a pending name fails
/// with `AlreadyExists`, and `delete_task` on an absent name fails with
/// `NotFound`.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn delete_task(&self, name: &str) -> Result<(), QueueError>;
    async fn create_task(&self, task: &ScheduledTask) -> Result<(), QueueError>;
}
