use chrono::{DateTime, Utc};
use serde::Serialize;

/// A named, time-delayed HTTP delivery held by the task queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Full resource name, `projects/.../queues/.../tasks/{id}`.
    pub name: String,
    pub url: String,
    pub payload: Vec<u8>,
    /// Extra headers sent with the delivery, alongside `Content-Type`.
    pub headers: Vec<(String, String)>,
    pub schedule_time: DateTime<Utc>,
    pub oidc_service_account: Option<String>,
}

/// Outcome of a successful schedule upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRun {
    pub task_name: String,
    pub run_at: DateTime<Utc>,
    /// RFC 3339 in the requested timezone.
    pub run_at_local: String,
    pub timezone: String,
}
