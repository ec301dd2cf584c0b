use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

use crate::services::gcp_auth::DEFAULT_METADATA_TOKEN_URL;
use crate::services::push::FCM_BASE_URL;
use crate::services::task_queue::CLOUD_TASKS_BASE_URL;
use crate::utils::task_name::QueuePath;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_QUEUE_LOCATION: &str = "us-central1";
pub const DEFAULT_QUEUE_NAME: &str = "daily-hadith";
pub const DEFAULT_FCM_TOPIC: &str = "daily-hadith";
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub frontend_origin: Option<String>,
    pub queue: QueuePath,
    pub dispatcher_url: String,
    pub dispatcher_service_account: Option<String>,
    /// Shared secret the queue presents when it calls the dispatcher.
    pub dispatch_secret: String,
    pub cloud_tasks_api_url: String,
    pub fcm_api_url: String,
    pub fcm_topic: String,
    pub hadith_source_url: String,
    pub static_access_token: Option<String>,
    pub metadata_token_url: String,
    pub http_timeout_secs: u64,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("pretty") | Some("text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            frontend_origin: get("FRONTEND_ORIGIN"),
            queue: QueuePath {
                project_id: require("GCP_PROJECT_ID")?,
                location: get("CLOUD_TASKS_LOCATION")
                    .unwrap_or_else(|| DEFAULT_QUEUE_LOCATION.to_string()),
                queue: get("CLOUD_TASKS_QUEUE").unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string()),
            },
            dispatcher_url: require("DISPATCHER_URL")?,
            dispatcher_service_account: get("DISPATCHER_SERVICE_ACCOUNT"),
            dispatch_secret: require("DISPATCH_SECRET")?,
            cloud_tasks_api_url: get("CLOUD_TASKS_API_URL")
                .unwrap_or_else(|| CLOUD_TASKS_BASE_URL.to_string()),
            fcm_api_url: get("FCM_API_URL").unwrap_or_else(|| FCM_BASE_URL.to_string()),
            fcm_topic: get("FCM_TOPIC").unwrap_or_else(|| DEFAULT_FCM_TOPIC.to_string()),
            hadith_source_url: require("HADITH_SOURCE_URL")?,
            static_access_token: get("GOOGLE_ACCESS_TOKEN"),
            metadata_token_url: get("GCE_METADATA_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_METADATA_TOKEN_URL.to_string()),
            http_timeout_secs: parse_or(
                get("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            rate_limit_ms: parse_or(
                get("RATE_LIMITER_MILLISECONDS"),
                "RATE_LIMITER_MILLISECONDS",
                DEFAULT_RATE_LIMIT_MS,
            )?,
            rate_limit_burst: parse_or(
                get("RATE_LIMITER_BURST"),
                "RATE_LIMITER_BURST",
                DEFAULT_RATE_LIMIT_BURST,
            )?,
            log_format,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("GCP_PROJECT_ID", "meshkah"),
        ("DISPATCHER_URL", "https://example.com/sendDailyHadith"),
        ("HADITH_SOURCE_URL", "https://example.com/hadith.json"),
        ("DISPATCH_SECRET", "s3cret"),
    ];

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(
            config.queue.parent(),
            "projects/meshkah/locations/us-central1/queues/daily-hadith"
        );
        assert_eq!(config.cloud_tasks_api_url, CLOUD_TASKS_BASE_URL);
        assert_eq!(config.fcm_topic, DEFAULT_FCM_TOPIC);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.frontend_origin.is_none());
        assert!(config.static_access_token.is_none());
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert_eq!(config.dispatch_secret, "s3cret");
    }

    #[test]
    fn reads_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "3000"),
            ("CLOUD_TASKS_QUEUE", "reminders"),
            ("CLOUD_TASKS_LOCATION", "europe-west1"),
            ("DISPATCHER_SERVICE_ACCOUNT", "tasks@meshkah.iam.gserviceaccount.com"),
            ("LOG_FORMAT", "json"),
            ("RATE_LIMITER_BURST", "5"),
            ("HTTP_TIMEOUT_SECS", "3"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.queue.queue, "reminders");
        assert_eq!(config.queue.location, "europe-west1");
        assert_eq!(
            config.dispatcher_service_account.as_deref(),
            Some("tasks@meshkah.iam.gserviceaccount.com")
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rate_limit_burst, 5);
        assert_eq!(config.http_timeout_secs, 3);
    }

    #[test]
    fn requires_project_and_endpoints() {
        let err = Config::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GCP_PROJECT_ID"));

        let mut blank = REQUIRED.to_vec();
        blank[1] = ("DISPATCHER_URL", "  ");
        let err = Config::from_lookup(lookup(&blank)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISPATCHER_URL"));

        let without_secret: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(key, _)| *key != "DISPATCH_SECRET")
            .collect();
        let err = Config::from_lookup(lookup(&without_secret)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISPATCH_SECRET"));
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
