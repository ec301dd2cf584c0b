use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::services::gcp_auth::AuthError;

mod fcm;

pub use fcm::{FcmPushSender, FCM_BASE_URL};

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("push authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("push service responded with status {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicMessage {
    pub topic: String,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Topic-based push delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Returns the provider's message id.
    async fn send_to_topic(&self, message: &TopicMessage) -> Result<String, PushError>;
}
