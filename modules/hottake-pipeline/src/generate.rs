//! The constrained-generation retry loop: generate, verify, escalate.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use hottake_common::config::{MAX_TRIES, PASS_SCORE};
use hottake_common::{Candidate, StanceRegistry, Tone};

use crate::judge::AlignmentJudge;
use crate::opinion::{OpinionGenerator, OpinionRequest};

/// Text emitted when every attempt came back blank.
const NO_OPINION_PLACEHOLDER: &str = "[no valid opinion generated]";

/// What one candidate's generation produced. `alignment_score` is `None`
/// when the candidate carried no stance constraints and verification was
/// skipped entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub opinion: String,
    pub alignment_score: Option<i64>,
}

/// Bounded generate→verify loop against external generator and judge
/// capabilities.
///
/// A candidate is never discarded for failing alignment: after `max_tries`
/// rejected attempts the last attempt's text and score are returned as
/// best-effort output, with the low score as the caveat signal. Generator and
/// judge transport errors are not handled here; they propagate to the run
/// loop.
pub struct ConstrainedGenerator {
    generator: Arc<dyn OpinionGenerator>,
    judge: Arc<dyn AlignmentJudge>,
    max_tries: u32,
    pass_score: i64,
}

impl ConstrainedGenerator {
    pub fn new(generator: Arc<dyn OpinionGenerator>, judge: Arc<dyn AlignmentJudge>) -> Self {
        Self {
            generator,
            judge,
            max_tries: MAX_TRIES,
            pass_score: PASS_SCORE,
        }
    }

    pub async fn generate(
        &self,
        candidate: &Candidate,
        registry: &StanceRegistry,
        tone: Tone,
    ) -> Result<GenerationOutcome> {
        let stances = registry.subset(&candidate.tags);

        // No constraints: vacuously satisfied, one unverified call.
        if stances.is_empty() {
            debug!(link = candidate.link, "No stance constraints, skipping verification");
            let request = self.request(candidate, stances, tone, 1);
            let opinion = self.generator.generate(&request).await?;
            return Ok(GenerationOutcome {
                opinion,
                alignment_score: None,
            });
        }

        let mut last = GenerationOutcome {
            opinion: NO_OPINION_PLACEHOLDER.to_string(),
            alignment_score: Some(0),
        };

        for attempt in 1..=self.max_tries {
            let request = self.request(candidate, stances.clone(), tone, attempt);
            let opinion = self.generator.generate(&request).await?;

            if opinion.trim().is_empty() {
                debug!(attempt, link = candidate.link, "Blank generation, not worth judging");
                continue;
            }

            let verdict = self.judge.verify(&opinion, &stances).await?;

            // The judge's own flag is necessary but never sufficient: an
            // inconsistent judge must not relax the score and topic checks.
            let accepted = verdict.passed
                && verdict.score >= self.pass_score
                && verdict.failed_topics.is_empty();

            info!(
                attempt,
                link = candidate.link,
                score = verdict.score,
                accepted,
                "Generation attempt judged"
            );

            let outcome = GenerationOutcome {
                opinion,
                alignment_score: Some(verdict.score),
            };
            if accepted {
                return Ok(outcome);
            }
            last = outcome;
        }

        info!(
            link = candidate.link,
            score = last.alignment_score.unwrap_or(0),
            "All attempts rejected, returning last attempt"
        );
        Ok(last)
    }

    fn request(
        &self,
        candidate: &Candidate,
        stances: StanceRegistry,
        tone: Tone,
        attempt: u32,
    ) -> OpinionRequest {
        let instructions = build_instructions(&stances, attempt);
        OpinionRequest {
            body: candidate.body.clone(),
            tags: candidate.tags.clone(),
            stances,
            tone,
            instructions,
        }
    }
}

fn build_instructions(stances: &StanceRegistry, attempt: u32) -> String {
    let mut lines = vec!["Follow the stance mapping exactly.".to_string()];
    for entry in stances.entries() {
        let verb = if entry.support {
            "express support for"
        } else {
            "express opposition to"
        };
        lines.push(format!("- You MUST {verb} {}.", entry.topic));
    }
    lines.push("Do not hedge or contradict yourself.".to_string());
    lines.push("Keep it concise (4-8 sentences).".to_string());

    if attempt > 1 {
        lines.push(String::new());
        lines.push("IMPORTANT: your previous attempt failed stance alignment.".to_string());
        lines.push("Correct the stance mistakes explicitly.".to_string());
        lines.push("Avoid sarcasm or ambiguous language.".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::judge::Verdict;
    use crate::testing::{ScriptedGenerator, ScriptedJudge};

    fn tagged_candidate(tags: &[&str]) -> Candidate {
        let mut candidate = Candidate::new(
            "Acme in the news",
            None,
            "https://example.com/acme",
            "summary",
        );
        candidate.body = "extracted article body".to_string();
        candidate.tags = tags.iter().map(|t| t.to_string()).collect();
        candidate
    }

    fn acme_registry() -> StanceRegistry {
        StanceRegistry::from_entries([("Acme".to_string(), true)])
    }

    fn harness(
        generator: ScriptedGenerator,
        judge: ScriptedJudge,
    ) -> (Arc<ScriptedGenerator>, Arc<ScriptedJudge>, ConstrainedGenerator) {
        let generator = Arc::new(generator);
        let judge = Arc::new(judge);
        let constrained = ConstrainedGenerator::new(generator.clone(), judge.clone());
        (generator, judge, constrained)
    }

    #[tokio::test]
    async fn empty_subset_skips_verification() {
        let (generator, judge, constrained) =
            harness(ScriptedGenerator::new(["free take"]), ScriptedJudge::new([]));

        let outcome = constrained
            .generate(&tagged_candidate(&[]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        assert_eq!(outcome.opinion, "free take");
        assert_eq!(outcome.alignment_score, None);
        assert_eq!(generator.calls(), 1);
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn first_attempt_accepted_stops_immediately() {
        let (generator, judge, constrained) = harness(
            ScriptedGenerator::new(["aligned take"]),
            ScriptedJudge::new([Verdict::passing(90)]),
        );

        let outcome = constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        assert_eq!(outcome.opinion, "aligned take");
        assert_eq!(outcome.alignment_score, Some(90));
        assert_eq!(generator.calls(), 1);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn three_rejections_return_last_attempt() {
        let (generator, judge, constrained) = harness(
            ScriptedGenerator::new(["take one", "take two", "take three"]),
            ScriptedJudge::new([
                Verdict::failing(40, vec!["Acme".to_string()]),
                Verdict::failing(50, vec!["Acme".to_string()]),
                Verdict::failing(50, vec!["Acme".to_string()]),
            ]),
        );

        let outcome = constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        assert_eq!(outcome.opinion, "take three");
        assert_eq!(outcome.alignment_score, Some(50));
        assert_eq!(generator.calls(), 3);
        assert_eq!(judge.calls(), 3);
    }

    #[tokio::test]
    async fn blank_attempt_skips_the_judge() {
        let (generator, judge, constrained) = harness(
            ScriptedGenerator::new(["", "real take"]),
            ScriptedJudge::new([Verdict::passing(95)]),
        );

        let outcome = constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        assert_eq!(outcome.opinion, "real take");
        assert_eq!(outcome.alignment_score, Some(95));
        assert_eq!(generator.calls(), 2);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn all_blank_attempts_yield_placeholder() {
        let (generator, judge, constrained) = harness(
            ScriptedGenerator::new(["", "", ""]),
            ScriptedJudge::new([]),
        );

        let outcome = constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        assert_eq!(outcome.opinion, NO_OPINION_PLACEHOLDER);
        assert_eq!(outcome.alignment_score, Some(0));
        assert_eq!(generator.calls(), 3);
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn judge_pass_flag_alone_is_not_trusted() {
        // passed=true but score under threshold.
        let (_, _, constrained) = harness(
            ScriptedGenerator::new(["t1", "t2", "t3"]),
            ScriptedJudge::new([
                Verdict {
                    passed: true,
                    score: 70,
                    failed_topics: vec![],
                    reasons: String::new(),
                },
                Verdict {
                    passed: true,
                    score: 95,
                    failed_topics: vec!["Acme".to_string()],
                    reasons: String::new(),
                },
                Verdict {
                    passed: false,
                    score: 95,
                    failed_topics: vec![],
                    reasons: String::new(),
                },
            ]),
        );

        let outcome = constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        // Every attempt violated one of the three conditions.
        assert_eq!(outcome.opinion, "t3");
        assert_eq!(outcome.alignment_score, Some(95));
    }

    #[tokio::test]
    async fn retries_escalate_the_instructions() {
        let (generator, _, constrained) = harness(
            ScriptedGenerator::new(["t1", "t2"]),
            ScriptedJudge::new([
                Verdict::failing(30, vec!["Acme".to_string()]),
                Verdict::passing(90),
            ]),
        );

        constrained
            .generate(&tagged_candidate(&["Acme"]), &acme_registry(), Tone::Heated)
            .await
            .unwrap();

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].instructions.contains("previous attempt"));
        assert!(requests[1].instructions.contains("previous attempt"));
        assert!(requests[0].instructions.contains("express support for Acme"));
    }

    #[tokio::test]
    async fn subset_restricts_to_candidate_tags() {
        let registry = StanceRegistry::from_entries([
            ("Acme".to_string(), true),
            ("Globex".to_string(), false),
        ]);
        let (generator, _, constrained) = harness(
            ScriptedGenerator::new(["take"]),
            ScriptedJudge::new([Verdict::passing(90)]),
        );

        constrained
            .generate(&tagged_candidate(&["Acme"]), &registry, Tone::Heated)
            .await
            .unwrap();

        let requests = generator.requests();
        assert_eq!(requests[0].stances.len(), 1);
        assert_eq!(requests[0].stances.stance_for("Acme"), Some(true));
        assert_eq!(requests[0].stances.stance_for("Globex"), None);
    }
}
