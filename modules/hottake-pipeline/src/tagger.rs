use hottake_common::{Candidate, StanceRegistry};

/// Recompute the authoritative tag set now that body text is available,
/// using the same case-insensitive substring rule as the relevance filter.
pub fn tag(candidate: &mut Candidate, registry: &StanceRegistry) {
    candidate.tags = registry.matched_topics(&candidate.full_text());
}

/// Order the working set fewest-tags-first (stable). Outputs built from
/// candidates that trigger the fewest forced stances carry the least
/// manufactured opinion, so they are emitted first. Heuristic ordering only.
pub fn sort_by_trust(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| c.tags.len());
}
