//! One pipeline run: collect → filter → extract → tag → generate → write.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use hottake_common::config::{
    BODY_TOKEN_BUDGET, KEEP_BATCHES, MAX_CANDIDATES, PACING_SECS,
};
use hottake_common::{Config, OutputRecord, Settings, StanceRegistry};

use crate::collector;
use crate::extract::ContentExtractor;
use crate::fetch::RetryingFetcher;
use crate::filter;
use crate::generate::ConstrainedGenerator;
use crate::judge::AlignmentJudge;
use crate::opinion::OpinionGenerator;
use crate::output::BatchWriter;
use crate::tagger;
use crate::traits::TokenTruncator;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub listing_url: String,
    pub registry_path: PathBuf,
    pub settings_path: PathBuf,
    pub data_dir: PathBuf,
    pub max_candidates: usize,
    pub max_body_tokens: usize,
    pub keep_batches: usize,
    /// Pause after each completed generation cycle (provider rate limit).
    pub pacing: Duration,
}

impl RunConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            listing_url: config.listing_url.clone(),
            registry_path: config.registry_path.clone(),
            settings_path: config.settings_path.clone(),
            data_dir: config.data_dir.clone(),
            max_candidates: MAX_CANDIDATES,
            max_body_tokens: BODY_TOKEN_BUDGET,
            keep_batches: KEEP_BATCHES,
            pacing: Duration::from_secs(PACING_SECS),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub collected: u32,
    pub matched: u32,
    pub extracted: u32,
    pub generated: u32,
    pub generation_failed: u32,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "collected={} matched={} extracted={} generated={} generation_failed={}",
            self.collected, self.matched, self.extracted, self.generated, self.generation_failed
        )
    }
}

/// The batch pipeline: one strictly sequential pass per invocation, one
/// candidate at a time, no concurrency and no cancellation. A crash mid-run
/// leaves the batch with the records flushed so far.
pub struct Pipeline {
    config: RunConfig,
    fetcher: RetryingFetcher,
    extractor: ContentExtractor,
    generator: ConstrainedGenerator,
}

impl Pipeline {
    pub fn new(
        config: RunConfig,
        fetcher: RetryingFetcher,
        truncator: Arc<dyn TokenTruncator>,
        generator: Arc<dyn OpinionGenerator>,
        judge: Arc<dyn AlignmentJudge>,
    ) -> Self {
        let extractor =
            ContentExtractor::new(fetcher.clone(), truncator, config.max_body_tokens);
        let generator = ConstrainedGenerator::new(generator, judge);
        Self {
            config,
            fetcher,
            extractor,
            generator,
        }
    }

    pub async fn run(&self) -> Result<RunStats> {
        let mut stats = RunStats::default();

        // Read-only snapshot for the whole run; admin edits apply next run.
        let registry = StanceRegistry::load_or_empty(&self.config.registry_path);
        info!(topics = registry.len(), "Loaded stance registry");

        let listing = self.fetcher.fetch(&self.config.listing_url).await;
        let candidates = collector::collect(&listing);
        stats.collected = candidates.len() as u32;

        let candidates =
            filter::filter_and_rank(candidates, &registry, self.config.max_candidates);
        stats.matched = candidates.len() as u32;
        info!(
            collected = stats.collected,
            matched = stats.matched,
            "Filtered candidates"
        );

        let mut surviving = Vec::new();
        for candidate in candidates {
            if let Some(candidate) = self.extractor.extract(candidate).await {
                surviving.push(candidate);
            }
        }
        stats.extracted = surviving.len() as u32;

        for candidate in &mut surviving {
            tagger::tag(candidate, &registry);
        }
        tagger::sort_by_trust(&mut surviving);

        let mut batch = BatchWriter::open(&self.config.data_dir, self.config.keep_batches)?;

        for candidate in surviving {
            // Tone is re-read per generation call; admin edits apply mid-run.
            let tone = Settings::load_or_default(&self.config.settings_path).tone;

            let outcome = match self.generator.generate(&candidate, &registry, tone).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Policy: a generator/judge failure skips this candidate
                    // and the run continues.
                    error!(link = candidate.link, error = %e, "Generation failed, skipping candidate");
                    stats.generation_failed += 1;
                    continue;
                }
            };

            let record = OutputRecord {
                title: candidate.title,
                date: candidate.published_at,
                link: candidate.link,
                tags: candidate.tags,
                opinion: outcome.opinion,
                alignment_score: outcome.alignment_score,
            };
            batch.append(&record)?;
            stats.generated += 1;

            tokio::time::sleep(self.config.pacing).await;
        }

        info!(%stats, "Pipeline run complete");
        Ok(stats)
    }
}
