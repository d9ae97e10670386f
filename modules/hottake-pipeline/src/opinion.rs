use anyhow::Result;
use async_trait::async_trait;

use ai_client::Claude;
use hottake_common::{StanceRegistry, Tone};

const GENERATOR_MODEL: &str = "claude-sonnet-4-20250514";

/// Structured input for one generation call.
#[derive(Debug, Clone)]
pub struct OpinionRequest {
    pub body: String,
    pub tags: Vec<String>,
    pub stances: StanceRegistry,
    pub tone: Tone,
    pub instructions: String,
}

/// External generation capability. Deliberately not idempotent: identical
/// requests may return different text.
#[async_trait]
pub trait OpinionGenerator: Send + Sync {
    async fn generate(&self, request: &OpinionRequest) -> Result<String>;
}

const OPINION_SYSTEM_PROMPT: &str = r#"You write short, personal, expressive opinion takes on news articles.

The user message carries the article text, the entities it mentions, the required tone, and a stance mapping.
The stance mapping is binding: true means your take must support that entity, false means it must oppose it, regardless of how the article itself frames the entity.
Write the opinion text directly, with no preamble, no headings, and no quotation marks around it."#;

/// Claude-backed opinion writer.
pub struct ClaudeOpinionWriter {
    claude: Claude,
}

impl ClaudeOpinionWriter {
    pub fn new(anthropic_api_key: &str) -> Self {
        Self {
            claude: Claude::new(anthropic_api_key, GENERATOR_MODEL),
        }
    }
}

#[async_trait]
impl OpinionGenerator for ClaudeOpinionWriter {
    async fn generate(&self, request: &OpinionRequest) -> Result<String> {
        let user = format!(
            "Tone: {tone}\n\nEntities: {tags}\n\nStance mapping (true = support, false = oppose):\n{stances}\n\nRules:\n{instructions}\n\nArticle:\n{body}",
            tone = request.tone.label(),
            tags = request.tags.join(", "),
            stances = request.stances.to_map_value(),
            instructions = request.instructions,
            body = request.body,
        );

        let opinion = self.claude.chat_completion(OPINION_SYSTEM_PROMPT, user).await?;
        Ok(opinion.trim().to_string())
    }
}
