//! HTTP item source
//!
//! Fetches the remote JSON item document. Every request carries a unique
//! `_ts` query parameter plus no-cache headers so no intermediary can answer
//! from a stale copy. One attempt per call; callers fall back to the cache.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use url::Url;

use crate::interface::{QuickClipError, RemoteSource};
use crate::models::ItemRecord;
use crate::transfer::parse_item_document;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CACHE_BUST_PARAM: &str = "_ts";

pub struct HttpItemSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpItemSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, QuickClipError> {
        let url = Url::parse(url)
            .map_err(|e| QuickClipError::Fetch(format!("invalid URL {url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuickClipError::Fetch(e.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The endpoint URL with a fresh cache-busting parameter
    fn request_url(&self) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &Utc::now().timestamp_millis().to_string());
        url
    }
}

#[async_trait]
impl RemoteSource for HttpItemSource {
    async fn fetch_items(&self) -> Result<Vec<ItemRecord>, QuickClipError> {
        let url = self.request_url();
        log::debug!("Fetching items from {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| QuickClipError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuickClipError::Fetch(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| QuickClipError::Fetch(e.to_string()))?;

        let parsed = parse_item_document(&body)?;
        if parsed.rejected > 0 {
            log::warn!("Remote document: skipped {} invalid entries", parsed.rejected);
        }
        Ok(parsed.records)
    }
}
