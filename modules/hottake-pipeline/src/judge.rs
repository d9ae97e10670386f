//! LLM judge: verifies a generated opinion against its required stances.

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use ai_client::Claude;
use hottake_common::StanceRegistry;

const JUDGE_MODEL: &str = "claude-haiku-4-5-20251001";

/// The judge's evaluation of one generation attempt.
///
/// `passed` alone is never trusted by the pipeline; acceptance also requires
/// the score threshold and an empty `failed_topics` (see
/// `ConstrainedGenerator`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub score: i64,
    pub failed_topics: Vec<String>,
    pub reasons: String,
}

impl Verdict {
    pub fn passing(score: i64) -> Self {
        Self {
            passed: true,
            score,
            failed_topics: Vec::new(),
            reasons: String::new(),
        }
    }

    pub fn failing(score: i64, failed_topics: Vec<String>) -> Self {
        Self {
            passed: false,
            score,
            failed_topics,
            reasons: "stance mismatch".to_string(),
        }
    }
}

/// External judging capability.
#[async_trait]
pub trait AlignmentJudge: Send + Sync {
    async fn verify(&self, opinion: &str, stances: &StanceRegistry) -> Result<Verdict>;
}

/// What the model reports. Every field is optional on the wire; coercion to
/// `Verdict` fails safe toward "not aligned".
#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct WireVerdict {
    /// True if the opinion aligns with ALL required stances.
    passed: Option<bool>,
    /// 0-100 alignment score; 100 is perfect alignment.
    score: Option<serde_json::Value>,
    /// Topics whose required stance the opinion violates.
    failed_topics: Option<Vec<String>>,
    /// Very short explanation of failures (1-3 sentences).
    reasons: Option<String>,
}

impl From<WireVerdict> for Verdict {
    fn from(wire: WireVerdict) -> Self {
        Verdict {
            passed: wire.passed.unwrap_or(false),
            score: coerce_score(wire.score.as_ref()),
            failed_topics: wire.failed_topics.unwrap_or_default(),
            reasons: wire.reasons.unwrap_or_default().trim().to_string(),
        }
    }
}

/// Non-numeric or missing scores coerce to 0 ("not aligned"); everything
/// numeric is clamped to [0, 100].
fn coerce_score(raw: Option<&serde_json::Value>) -> i64 {
    let score = match raw {
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0)
        }
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    score.clamp(0, 100)
}

const JUDGE_SYSTEM_PROMPT: &str = r#"You evaluate whether an opinion text aligns with a required stance mapping.

The stance mapping maps entity names to booleans: true means the opinion must SUPPORT the entity, false means it must OPPOSE it.
Judge only stance alignment, not writing quality. Hedged, ambiguous, or sarcastic positions on a mapped entity count against alignment.
Report your evaluation through the structured_response tool."#;

/// Claude-backed alignment judge.
pub struct ClaudeJudge {
    claude: Claude,
}

impl ClaudeJudge {
    pub fn new(anthropic_api_key: &str) -> Self {
        Self {
            claude: Claude::new(anthropic_api_key, JUDGE_MODEL),
        }
    }
}

#[async_trait]
impl AlignmentJudge for ClaudeJudge {
    async fn verify(&self, opinion: &str, stances: &StanceRegistry) -> Result<Verdict> {
        let user = format!(
            "Stance mapping (true = must support, false = must oppose):\n{stances}\n\nOpinion under evaluation:\n{opinion}",
            stances = stances.to_map_value(),
        );

        let wire: WireVerdict = self.claude.extract(JUDGE_SYSTEM_PROMPT, user).await?;
        let verdict = Verdict::from(wire);

        info!(
            passed = verdict.passed,
            score = verdict.score,
            failed = verdict.failed_topics.len(),
            "Judge verdict"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_safe() {
        let verdict: Verdict = WireVerdict {
            passed: None,
            score: None,
            failed_topics: None,
            reasons: None,
        }
        .into();

        assert!(!verdict.passed);
        assert_eq!(verdict.score, 0);
        assert!(verdict.failed_topics.is_empty());
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn score_is_clamped_to_percentage_range() {
        assert_eq!(coerce_score(Some(&serde_json::json!(250))), 100);
        assert_eq!(coerce_score(Some(&serde_json::json!(-10))), 0);
        assert_eq!(coerce_score(Some(&serde_json::json!(85))), 85);
    }

    #[test]
    fn non_numeric_scores_coerce_to_zero() {
        assert_eq!(coerce_score(Some(&serde_json::json!("85"))), 85);
        assert_eq!(coerce_score(Some(&serde_json::json!("very good"))), 0);
        assert_eq!(coerce_score(Some(&serde_json::json!(null))), 0);
        assert_eq!(coerce_score(Some(&serde_json::json!([90]))), 0);
        assert_eq!(coerce_score(None), 0);
    }

    #[test]
    fn reasons_are_trimmed() {
        let verdict: Verdict = WireVerdict {
            passed: Some(true),
            score: Some(serde_json::json!(90)),
            failed_topics: None,
            reasons: Some("  aligned on every entity \n".into()),
        }
        .into();
        assert_eq!(verdict.reasons, "aligned on every entity");
    }
}
