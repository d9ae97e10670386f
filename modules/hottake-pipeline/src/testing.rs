// Test mocks for the pipeline's capability traits.
//
// One mock per boundary:
// - StaticFetcher (PageFetcher): HashMap-based URL to outcome
// - SequenceFetcher (PageFetcher): scripted sequence of attempt outcomes
// - ScriptedGenerator (OpinionGenerator): queued replies, records requests
// - ScriptedJudge (AlignmentJudge): queued verdicts, counts calls
// - WordTruncator (TokenTruncator): whitespace tokens
//
// Plus small fixture builders for RSS listings and article pages.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use hottake_common::StanceRegistry;

use crate::judge::{AlignmentJudge, Verdict};
use crate::opinion::{OpinionGenerator, OpinionRequest};
use crate::traits::{FetchOutcome, PageFetcher, TokenTruncator};

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

/// HashMap-based fetcher. Unregistered URLs fail every attempt.
/// Builder pattern: `.on(url, outcome)`.
pub struct StaticFetcher {
    pages: HashMap<String, FetchOutcome>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.pages.insert(url.to_string(), outcome);
        self
    }

    /// Every URL requested so far, in order (repeats included).
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for StaticFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn get(&self, url: &str) -> FetchOutcome {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchOutcome::err(format!("no page registered for {url}")))
    }
}

// ---------------------------------------------------------------------------
// SequenceFetcher
// ---------------------------------------------------------------------------

/// Returns scripted outcomes in order, regardless of URL; once exhausted,
/// every further attempt fails. Counts attempts for retry assertions.
pub struct SequenceFetcher {
    outcomes: Mutex<VecDeque<FetchOutcome>>,
    attempts: AtomicU32,
}

impl SequenceFetcher {
    pub fn new<I: IntoIterator<Item = FetchOutcome>>(outcomes: I) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for SequenceFetcher {
    async fn get(&self, _url: &str) -> FetchOutcome {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| FetchOutcome::err("sequence exhausted"))
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// One scripted generator reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Error(String),
}

/// Queue-based opinion generator. Replies are served in order; an exhausted
/// queue keeps returning a fixed fallback take. Every request is recorded for
/// prompt/instruction assertions.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<OpinionRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = outputs
            .into_iter()
            .map(|s| ScriptedReply::Text(s.into()))
            .collect();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies<I: IntoIterator<Item = ScriptedReply>>(replies: I) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<OpinionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OpinionGenerator for ScriptedGenerator {
    async fn generate(&self, request: &OpinionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(reason)) => Err(anyhow!(reason)),
            None => Ok("scripted fallback take".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedJudge
// ---------------------------------------------------------------------------

/// Queue-based judge. Verdicts are served in order; an exhausted queue keeps
/// rejecting with score 0.
pub struct ScriptedJudge {
    verdicts: Mutex<VecDeque<Verdict>>,
    calls: AtomicU32,
}

impl ScriptedJudge {
    pub fn new<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlignmentJudge for ScriptedJudge {
    async fn verify(&self, _opinion: &str, _stances: &StanceRegistry) -> Result<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Verdict::failing(0, Vec::new())))
    }
}

// ---------------------------------------------------------------------------
// WordTruncator
// ---------------------------------------------------------------------------

/// Whitespace "tokens": a deterministic stand-in for the real tokenizer.
pub struct WordTruncator;

impl TokenTruncator for WordTruncator {
    fn truncate(&self, text: &str, max_tokens: usize) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= max_tokens {
            Ok(text.to_string())
        } else {
            Ok(words[..max_tokens].join(" "))
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build an RSS 2.0 listing from (title, link, pub_date RFC 2822, summary).
pub fn rss_listing(items: &[(&str, &str, Option<&str>, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>listing</title>"#,
    );
    for (title, link, pub_date, summary) in items {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{title}</title>"));
        xml.push_str(&format!("<link>{link}</link>"));
        if let Some(date) = pub_date {
            xml.push_str(&format!("<pubDate>{date}</pubDate>"));
        }
        if !summary.is_empty() {
            xml.push_str(&format!("<description>{summary}</description>"));
        }
        xml.push_str("</item>");
    }
    xml.push_str("</channel></rss>");
    xml
}

/// Build a minimal article page with the given paragraphs.
pub fn article_html(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{p}</p>"))
        .collect();
    format!(
        "<html><head><title>article</title></head><body><article>{body}</article></body></html>"
    )
}
