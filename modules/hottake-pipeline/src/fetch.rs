use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use hottake_common::config::{FETCH_RETRIES, FETCH_WAIT_SECS};

use crate::traits::{FetchOutcome, PageFetcher};

/// Plain HTTP fetcher. Any transport error or non-success status becomes a
/// `Failure` outcome for the retry layer to count.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> FetchOutcome {
        let response = match self
            .client
            .get(url)
            .header("User-Agent", "hottake/0.1")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::err(e.to_string()),
        };

        if !response.status().is_success() {
            return FetchOutcome::err(format!("status {}", response.status()));
        }

        match response.text().await {
            Ok(body) => FetchOutcome::ok(body),
            Err(e) => FetchOutcome::err(e.to_string()),
        }
    }
}

/// Bounded fixed-delay retry around a single-attempt fetcher.
///
/// Sleeps `wait` before every attempt (including the first) and stops at the
/// first non-empty success. Exhaustion degrades to the empty string: callers
/// see "fetch failed" and "content legitimately empty" as the same outcome.
#[derive(Clone)]
pub struct RetryingFetcher {
    inner: Arc<dyn PageFetcher>,
    retries: u32,
    wait: Duration,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn PageFetcher>, retries: u32, wait: Duration) -> Self {
        Self { inner, retries, wait }
    }

    pub fn with_defaults(inner: Arc<dyn PageFetcher>) -> Self {
        Self::new(inner, FETCH_RETRIES, Duration::from_secs(FETCH_WAIT_SECS))
    }

    pub async fn fetch(&self, url: &str) -> String {
        for attempt in 1..=self.retries {
            tokio::time::sleep(self.wait).await;
            match self.inner.get(url).await {
                FetchOutcome::Success(content) if !content.trim().is_empty() => {
                    debug!(url, attempt, bytes = content.len(), "Fetched");
                    return content;
                }
                FetchOutcome::Success(_) => {
                    debug!(url, attempt, "Fetch attempt returned empty content");
                }
                FetchOutcome::Failure(reason) => {
                    debug!(url, attempt, reason, "Fetch attempt failed");
                }
            }
        }
        warn!(url, retries = self.retries, "Fetch exhausted all retries");
        String::new()
    }
}
