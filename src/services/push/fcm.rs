use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{PushError, PushSender, TopicMessage};
use crate::services::gcp_auth::TokenProvider;

pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com/v1";

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

/// Firebase Cloud Messaging HTTP v1 sender.
pub struct FcmPushSender {
    client: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl FcmPushSender {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            tokens,
        }
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send_to_topic(&self, message: &TopicMessage) -> Result<String, PushError> {
        let token = self.tokens.access_token().await?;
        let url = format!(
            "{}/projects/{}/messages:send",
            self.base_url.trim_end_matches('/'),
            self.project_id
        );
        let payload = json!({
            "message": {
                "topic": message.topic,
                "notification": {
                    "title": message.title,
                    "body": message.body,
                },
                "data": message.data,
            }
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(PushError::Api { status, message });
        }

        let body: SendResponse = resp.json().await?;
        Ok(body.name)
    }
}
