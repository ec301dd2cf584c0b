use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::models::schedule_request::ScheduleRequest;
use crate::services::hadith_source::{HadithSource, HadithSourceError};
use crate::services::push::{PushError, PushSender, TopicMessage};
use crate::utils::task_name::token_suffix;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid dispatch payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Content(#[from] HadithSourceError),
    #[error(transparent)]
    Push(#[from] PushError),
}

/// Decodes a fired task body. Cloud Tasks delivers the raw JSON, but a
/// base64-wrapped body is accepted as well.
pub fn decode_payload(body: &[u8]) -> Result<ScheduleRequest, DispatchError> {
    if let Ok(request) = serde_json::from_slice::<ScheduleRequest>(body) {
        return Ok(request);
    }

    let text = std::str::from_utf8(body)
        .map_err(|err| DispatchError::InvalidPayload(err.to_string()))?;
    let decoded = STANDARD
        .decode(text.trim().trim_matches('"'))
        .map_err(|err| DispatchError::InvalidPayload(err.to_string()))?;
    serde_json::from_slice(&decoded).map_err(|err| DispatchError::InvalidPayload(err.to_string()))
}

/// Delivers the daily hadith when a scheduled task fires.
pub struct NotificationDispatcher {
    source: Arc<dyn HadithSource>,
    push: Arc<dyn PushSender>,
    topic: String,
}

impl NotificationDispatcher {
    pub fn new(source: Arc<dyn HadithSource>, push: Arc<dyn PushSender>, topic: impl Into<String>) -> Self {
        Self {
            source,
            push,
            topic: topic.into(),
        }
    }

    pub async fn dispatch(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> Result<String, DispatchError> {
        let hadith = self.source.daily_hadith(now).await.inspect_err(|err| {
            error!(user_id = %request.user_id, error = %err, "failed to load daily hadith");
        })?;

        let mut data = BTreeMap::new();
        if let Some(id) = &hadith.id {
            data.insert("hadithId".to_string(), id.clone());
        }
        if let Some(attribution) = &hadith.attribution {
            data.insert("attribution".to_string(), attribution.clone());
        }
        data.insert("scheduledFor".to_string(), request.time.clone());

        let title = if hadith.title.trim().is_empty() {
            "Daily Hadith".to_string()
        } else {
            hadith.title.clone()
        };
        let message = TopicMessage {
            topic: self.topic.clone(),
            title,
            body: hadith.body.clone(),
            data,
        };

        let message_id = self.push.send_to_topic(&message).await.inspect_err(|err| {
            error!(
                user_id = %request.user_id,
                topic = %self.topic,
                error = %err,
                "failed to push daily hadith"
            );
        })?;

        info!(
            user_id = %request.user_id,
            token_suffix = token_suffix(&request.fcm_token),
            topic = %self.topic,
            message_id = %message_id,
            "delivered daily hadith"
        );
        Ok(message_id)
    }
}
