use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::models::hadith::DailyHadith;
use crate::services::dispatcher::NotificationDispatcher;
use crate::services::hadith_source::{HadithSource, HadithSourceError};
use crate::services::push::MockPushSender;
use crate::services::scheduler::{DispatchTarget, NotificationScheduler};
use crate::services::task_queue::MockTaskQueue;
use crate::state::AppState;

pub const TEST_DISPATCH_SECRET: &str = "dispatch-s3cret";

pub struct StubHadithSource(pub Option<DailyHadith>);

#[async_trait]
impl HadithSource for StubHadithSource {
    async fn daily_hadith(&self, _now: DateTime<Utc>) -> Result<DailyHadith, HadithSourceError> {
        self.0.clone().ok_or(HadithSourceError::Empty)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "GCP_PROJECT_ID" => Some("meshkah".into()),
        "DISPATCHER_URL" => Some("https://example.com/sendDailyHadith".into()),
        "HADITH_SOURCE_URL" => Some("https://example.com/hadith.json".into()),
        "GOOGLE_ACCESS_TOKEN" => Some("test-token".into()),
        "DISPATCH_SECRET" => Some(TEST_DISPATCH_SECRET.into()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn sample_hadith() -> DailyHadith {
    DailyHadith {
        id: Some("1".into()),
        title: "Intentions".into(),
        body: "Actions are judged by intentions".into(),
        attribution: Some("Bukhari & Muslim".into()),
    }
}

pub fn test_state(
    queue: Arc<MockTaskQueue>,
    source: StubHadithSource,
    push: MockPushSender,
) -> AppState {
    let config = test_config();
    let scheduler = NotificationScheduler::new(
        queue,
        config.queue.clone(),
        DispatchTarget {
            url: config.dispatcher_url.clone(),
            oidc_service_account: None,
            secret: config.dispatch_secret.clone(),
        },
    );
    let dispatcher =
        NotificationDispatcher::new(Arc::new(source), Arc::new(push), config.fcm_topic.clone());
    AppState {
        scheduler: Arc::new(scheduler),
        dispatcher: Arc::new(dispatcher),
        config: Arc::new(config),
    }
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
