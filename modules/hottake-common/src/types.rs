use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One discovered content item, enriched as it moves through the pipeline.
///
/// `body` stays empty until extraction; `tags` stays empty until tagging.
/// A candidate whose extracted body comes back empty is dropped and never
/// reaches generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub link: String,
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        link: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            published_at,
            link: link.into(),
            summary: summary.into(),
            body: String::new(),
            tags: Vec::new(),
        }
    }

    /// Title + summary, the text the relevance filter matches against.
    pub fn heading_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Title + summary + body, the text the tagger matches against.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.body)
    }
}

/// Output tone selector, edited through the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    General,
    Heated,
    Humoristic,
}

impl Tone {
    /// Label handed to the generator prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::General => "general opinion",
            Tone::Heated => "heated opinion",
            Tone::Humoristic => "humoristic opinion",
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Heated
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The persisted unit: one JSON line per processed candidate, immutable once
/// written. `alignment_score` is null when the candidate carried no stance
/// constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub link: String,
    pub tags: Vec<String>,
    pub opinion: String,
    pub alignment_score: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_record_round_trips_through_json() {
        let record = OutputRecord {
            title: "Grön omställning försenas".to_string(),
            date: Some(Utc::now()),
            link: "https://example.com/a".to_string(),
            tags: vec!["Acme".to_string()],
            opinion: "Strongly in favor, no hedging.".to_string(),
            alignment_score: Some(85),
        };

        let line = serde_json::to_string(&record).unwrap();
        let parsed: OutputRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
        // Non-ASCII stays unescaped in the serialized line.
        assert!(line.contains("Grön"));
    }

    #[test]
    fn tone_labels() {
        assert_eq!(Tone::Neutral.label(), "neutral");
        assert_eq!(Tone::default(), Tone::Heated);
        assert_eq!(Tone::Humoristic.to_string(), "humoristic opinion");
    }
}
