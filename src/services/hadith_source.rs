use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::hadith::DailyHadith;

#[derive(Debug, Error)]
pub enum HadithSourceError {
    #[error("hadith source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hadith source responded with status {0}")]
    Status(u16),
    #[error("hadith source returned no items")]
    Empty,
}

/// Picks the content item for a given day.
#[async_trait]
pub trait HadithSource: Send + Sync {
    async fn daily_hadith(&self, now: DateTime<Utc>) -> Result<DailyHadith, HadithSourceError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HadithListing {
    Bare(Vec<DailyHadith>),
    Wrapped { data: Vec<DailyHadith> },
}

/// Reads a JSON list of hadith and rotates through it by day of year.
pub struct HttpHadithSource {
    client: Client,
    url: String,
}

impl HttpHadithSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

pub(crate) fn pick_for_day(
    mut items: Vec<DailyHadith>,
    now: DateTime<Utc>,
) -> Option<DailyHadith> {
    if items.is_empty() {
        return None;
    }
    let index = now.ordinal0() as usize % items.len();
    Some(items.swap_remove(index))
}

#[async_trait]
impl HadithSource for HttpHadithSource {
    async fn daily_hadith(&self, now: DateTime<Utc>) -> Result<DailyHadith, HadithSourceError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(HadithSourceError::Status(resp.status().as_u16()));
        }
        let items = match resp.json::<HadithListing>().await? {
            HadithListing::Bare(items) => items,
            HadithListing::Wrapped { data } => data,
        };
        pick_for_day(items, now).ok_or(HadithSourceError::Empty)
    }
}
