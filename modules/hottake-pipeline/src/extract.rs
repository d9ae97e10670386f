use std::sync::Arc;

use tracing::{debug, warn};

use hottake_common::Candidate;

use crate::fetch::RetryingFetcher;
use crate::readability;
use crate::traits::TokenTruncator;

/// Fills in a candidate's body: fetch the full page, extract readable text,
/// cut to the token budget.
///
/// The only stage allowed to discard work already done upstream: a candidate
/// whose fetch or extraction comes back empty returns `None` and is gone for
/// good. Fetch retries already happened inside the retrying fetcher; there is
/// no second chance here.
pub struct ContentExtractor {
    fetcher: RetryingFetcher,
    truncator: Arc<dyn TokenTruncator>,
    max_tokens: usize,
}

impl ContentExtractor {
    pub fn new(
        fetcher: RetryingFetcher,
        truncator: Arc<dyn TokenTruncator>,
        max_tokens: usize,
    ) -> Self {
        Self {
            fetcher,
            truncator,
            max_tokens,
        }
    }

    pub async fn extract(&self, mut candidate: Candidate) -> Option<Candidate> {
        let html = self.fetcher.fetch(&candidate.link).await;
        if html.trim().is_empty() {
            warn!(url = candidate.link, "No content for candidate, dropping");
            return None;
        }

        let text = readability::html_to_text(&html, Some(&candidate.link));
        let body = match self.truncator.truncate(&text, self.max_tokens) {
            Ok(body) => body,
            Err(e) => {
                warn!(url = candidate.link, error = %e, "Truncation failed, dropping candidate");
                return None;
            }
        };

        if body.trim().is_empty() {
            warn!(url = candidate.link, "Extracted body is empty, dropping candidate");
            return None;
        }

        debug!(url = candidate.link, chars = body.len(), "Extracted body");
        candidate.body = body;
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{article_html, StaticFetcher, WordTruncator};
    use crate::traits::FetchOutcome;

    fn extractor(fetcher: StaticFetcher, max_tokens: usize) -> ContentExtractor {
        let retrying = RetryingFetcher::new(Arc::new(fetcher), 2, Duration::ZERO);
        ContentExtractor::new(retrying, Arc::new(WordTruncator), max_tokens)
    }

    fn candidate(link: &str) -> Candidate {
        Candidate::new("A title", None, link, "a summary")
    }

    #[tokio::test]
    async fn sets_body_from_page_text() {
        let page = article_html(&[
            "Acme announced a sweeping reorganization of its widget division on Monday.",
            "Analysts called the move long overdue and pointed to years of flat sales.",
        ]);
        let fetcher = StaticFetcher::new().on("https://example.com/a", FetchOutcome::ok(page));

        let extracted = extractor(fetcher, 500)
            .extract(candidate("https://example.com/a"))
            .await
            .expect("body should extract");

        assert!(extracted.body.contains("widget division"));
        // Textual blocks are joined by single spaces, never raw newlines.
        assert!(!extracted.body.contains('\n'));
    }

    #[tokio::test]
    async fn truncates_to_token_budget() {
        let page = article_html(&[
            "Acme announced a sweeping reorganization of its widget division on Monday morning.",
            "Analysts called the move long overdue and pointed to several years of flat sales.",
            "Union representatives said they had not been consulted about the announced changes.",
        ]);
        let fetcher = StaticFetcher::new().on("https://example.com/a", FetchOutcome::ok(page));

        let extracted = extractor(fetcher, 5)
            .extract(candidate("https://example.com/a"))
            .await
            .unwrap();

        let words = extracted.body.split_whitespace().count();
        assert!(words >= 1 && words <= 5, "got {words} words");
    }

    #[tokio::test]
    async fn short_body_is_returned_unchanged() {
        let truncator = WordTruncator;
        use crate::traits::TokenTruncator;
        let text = "already well under budget";
        assert_eq!(truncator.truncate(text, 100).unwrap(), text);
    }

    #[tokio::test]
    async fn exhausted_fetch_drops_candidate() {
        let fetcher = StaticFetcher::new(); // nothing registered: every attempt fails
        let dropped = extractor(fetcher, 500)
            .extract(candidate("https://example.com/missing"))
            .await;
        assert!(dropped.is_none());
    }
}
