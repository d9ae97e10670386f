use tracing::{debug, warn};

use hottake_common::Candidate;

/// Turn a fetched listing document (RSS/Atom) into lightweight candidates.
///
/// Extraction is best-effort per entry: anything missing a title or link is
/// skipped silently, and an unparseable document collects nothing; a broken
/// listing never aborts the run. Document order is preserved and duplicate
/// links are not collapsed.
pub fn collect(listing: &str) -> Vec<Candidate> {
    let feed = match feed_rs::parser::parse(listing.as_bytes()) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, "Listing did not parse as a feed");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for entry in feed.entries {
        let Some(link) = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .filter(|href| !href.is_empty())
        else {
            continue;
        };
        let Some(title) = entry
            .title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty())
        else {
            continue;
        };

        let published = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&chrono::Utc));
        let summary = entry.summary.map(|t| t.content).unwrap_or_default();

        candidates.push(Candidate::new(title, published, link, summary));
    }

    debug!(candidates = candidates.len(), "Collected candidates from listing");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rss_listing;

    #[test]
    fn collects_in_document_order() {
        let listing = rss_listing(&[
            ("First story", "https://example.com/1", Some("Mon, 03 Aug 2026 10:00:00 GMT"), "about acme"),
            ("Second story", "https://example.com/2", Some("Tue, 04 Aug 2026 10:00:00 GMT"), "about globex"),
        ]);

        let candidates = collect(&listing);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "First story");
        assert_eq!(candidates[1].link, "https://example.com/2");
        assert_eq!(candidates[0].summary, "about acme");
        assert!(candidates[0].published_at.is_some());
        assert!(candidates[0].body.is_empty());
        assert!(candidates[0].tags.is_empty());
    }

    #[test]
    fn skips_entries_missing_required_fields() {
        let listing = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
                <title>feed</title>
                <item><title>No link here</title></item>
                <item><title>Complete</title><link>https://example.com/ok</link></item>
            </channel></rss>"#;

        let candidates = collect(listing);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Complete");
    }

    #[test]
    fn unparseable_listing_collects_nothing() {
        assert!(collect("<html>definitely not a feed").is_empty());
        assert!(collect("").is_empty());
    }

    #[test]
    fn missing_timestamp_is_none() {
        let listing = rss_listing(&[("Untimed", "https://example.com/u", None, "")]);
        let candidates = collect(&listing);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].published_at.is_none());
    }
}
