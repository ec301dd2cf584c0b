use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::SecondsFormat;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{QueueError, TaskQueue};
use crate::models::scheduled_task::ScheduledTask;
use crate::services::gcp_auth::TokenProvider;
use crate::utils::task_name::QueuePath;

pub const CLOUD_TASKS_BASE_URL: &str = "https://cloudtasks.googleapis.com/v2";

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Cloud Tasks REST v2 adapter.
pub struct CloudTasksQueue {
    client: Client,
    base_url: String,
    queue: QueuePath,
    tokens: Arc<dyn TokenProvider>,
}

impl CloudTasksQueue {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        queue: QueuePath,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            queue,
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn task_body(task: &ScheduledTask) -> Value {
        let mut http_request = json!({
            "httpMethod": "POST",
            "url": task.url,
            "headers": { "Content-Type": "application/json" },
            "body": STANDARD.encode(&task.payload),
        });
        for (name, value) in &task.headers {
            http_request["headers"][name.as_str()] = json!(value);
        }
        if let Some(account) = &task.oidc_service_account {
            http_request["oidcToken"] = json!({
                "serviceAccountEmail": account,
                "audience": task.url,
            });
        }

        json!({
            "task": {
                "name": task.name,
                "scheduleTime": task.schedule_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                "httpRequest": http_request,
            }
        })
    }
}

async fn classify_failure(resp: Response, name: &str) -> QueueError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let google = serde_json::from_str::<GoogleErrorBody>(&text)
        .ok()
        .map(|body| body.error);
    let grpc_status = google.as_ref().map(|e| e.status.as_str()).unwrap_or("");

    if status == StatusCode::NOT_FOUND || grpc_status == "NOT_FOUND" {
        return QueueError::NotFound(name.to_string());
    }
    if status == StatusCode::CONFLICT || grpc_status == "ALREADY_EXISTS" {
        return QueueError::AlreadyExists(name.to_string());
    }

    let message = google.map(|e| e.message).unwrap_or(text);
    QueueError::Unavailable(format!("Cloud Tasks responded with {}: {}", status, message))
}

#[async_trait]
impl TaskQueue for CloudTasksQueue {
    async fn delete_task(&self, name: &str) -> Result<(), QueueError> {
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .delete(self.url(name))
            .bearer_auth(token)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(classify_failure(resp, name).await)
        }
    }

    async fn create_task(&self, task: &ScheduledTask) -> Result<(), QueueError> {
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .post(self.url(&format!("{}/tasks", self.queue.parent())))
            .bearer_auth(token)
            .json(&Self::task_body(task))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(classify_failure(resp, &task.name).await)
        }
    }
}
