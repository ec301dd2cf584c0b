use thiserror::Error;

use crate::services::task_queue::QueueError;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),
    #[error("task queue unavailable: {0}")]
    QueueUnavailable(String),
    #[error("a notification is already scheduled: {0}")]
    DuplicateSchedule(String),
}

impl From<QueueError> for ScheduleError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::AlreadyExists(name) => ScheduleError::DuplicateSchedule(name),
            other => ScheduleError::QueueUnavailable(other.to_string()),
        }
    }
}
