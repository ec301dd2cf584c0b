use reqwest::Client;
use std::sync::Arc;

use crate::config::Config;
use crate::services::dispatcher::NotificationDispatcher;
use crate::services::gcp_auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider};
use crate::services::hadith_source::HttpHadithSource;
use crate::services::push::FcmPushSender;
use crate::services::scheduler::{DispatchTarget, NotificationScheduler};
use crate::services::task_queue::CloudTasksQueue;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<NotificationScheduler>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the Google-backed adapters described by `config`.
    pub fn from_config(config: Config, http_client: Client) -> Self {
        let tokens: Arc<dyn TokenProvider> = match &config.static_access_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(MetadataTokenProvider::new(
                http_client.clone(),
                config.metadata_token_url.clone(),
            )),
        };

        let queue = Arc::new(CloudTasksQueue::new(
            http_client.clone(),
            config.cloud_tasks_api_url.clone(),
            config.queue.clone(),
            tokens.clone(),
        ));
        let scheduler = NotificationScheduler::new(
            queue,
            config.queue.clone(),
            DispatchTarget {
                url: config.dispatcher_url.clone(),
                oidc_service_account: config.dispatcher_service_account.clone(),
                secret: config.dispatch_secret.clone(),
            },
        );

        let push = Arc::new(FcmPushSender::new(
            http_client.clone(),
            config.fcm_api_url.clone(),
            config.queue.project_id.clone(),
            tokens,
        ));
        let source = Arc::new(HttpHadithSource::new(
            http_client,
            config.hadith_source_url.clone(),
        ));
        let dispatcher = NotificationDispatcher::new(source, push, config.fcm_topic.clone());

        AppState {
            scheduler: Arc::new(scheduler),
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }
}
