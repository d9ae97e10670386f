use tracing::debug;

use hottake_common::{Candidate, StanceRegistry};

/// Relevance filter and ranker.
///
/// Keeps candidates whose title+summary text contains at least one registry
/// topic (case-insensitive substring; a topic inside an unrelated word still
/// hits, by design), drops anything without a publish time, orders newest
/// first (stable for equal timestamps), and caps the result at `max`.
///
/// An empty registry matches nothing, so an upstream registry failure that
/// degraded to empty selects nothing rather than crashing the run.
pub fn filter_and_rank(
    candidates: Vec<Candidate>,
    registry: &StanceRegistry,
    max: usize,
) -> Vec<Candidate> {
    let before = candidates.len();

    let mut matched: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| registry.matches(&c.heading_text()))
        .collect();

    matched.retain(|c| c.published_at.is_some());
    matched.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    matched.truncate(max);

    debug!(before, after = matched.len(), "Filtered and ranked candidates");
    matched
}
