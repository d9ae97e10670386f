// Capability boundaries for the pipeline.
//
// Everything external sits behind a trait object injected at construction:
// no global client state, and deterministic tests run against the mocks in
// `testing`: no network, no tokenizer files, no API keys.

use anyhow::Result;
use async_trait::async_trait;

/// Result of a single fetch attempt. The retry policy operates on this type
/// directly; transport and parse errors never travel as caught panics or
/// exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(String),
    Failure(String),
}

impl FetchOutcome {
    pub fn ok(content: impl Into<String>) -> Self {
        FetchOutcome::Success(content.into())
    }

    pub fn err(reason: impl Into<String>) -> Self {
        FetchOutcome::Failure(reason.into())
    }
}

/// One fetch attempt for a URL. Implementations must not retry internally;
/// retrying belongs to `RetryingFetcher`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> FetchOutcome;
}

/// Generation-model token budget: encode, keep the first `max_tokens` ids,
/// decode. Text already within budget must come back unchanged.
pub trait TokenTruncator: Send + Sync {
    fn truncate(&self, text: &str, max_tokens: usize) -> Result<String>;
}
