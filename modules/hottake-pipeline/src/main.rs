use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hottake_common::config::MAX_CANDIDATES;
use hottake_common::Config;
use hottake_pipeline::fetch::{HttpFetcher, RetryingFetcher};
use hottake_pipeline::judge::{AlignmentJudge, ClaudeJudge};
use hottake_pipeline::opinion::{ClaudeOpinionWriter, OpinionGenerator};
use hottake_pipeline::tokenizer::HfTruncator;
use hottake_pipeline::traits::TokenTruncator;
use hottake_pipeline::{Pipeline, RunConfig};

#[derive(Parser)]
#[command(name = "hottake", about = "Stance-constrained opinion batch over a listing feed")]
struct Args {
    /// Override the listing feed URL from the environment.
    #[arg(long)]
    listing_url: Option<String>,

    /// Override the output directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Cap on candidates fed into generation this run.
    #[arg(long, default_value_t = MAX_CANDIDATES)]
    max_candidates: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hottake=info".parse()?))
        .init();

    let args = Args::parse();

    info!("hottake pipeline starting...");
    let config = Config::from_env();

    let mut run_config = RunConfig::from_config(&config);
    if let Some(url) = args.listing_url {
        run_config.listing_url = url;
    }
    if let Some(dir) = args.data_dir {
        run_config.data_dir = dir;
    }
    run_config.max_candidates = args.max_candidates;

    let fetcher = RetryingFetcher::with_defaults(Arc::new(HttpFetcher::new()));
    let truncator: Arc<dyn TokenTruncator> =
        Arc::new(HfTruncator::from_file(&config.tokenizer_path)?);
    let generator: Arc<dyn OpinionGenerator> =
        Arc::new(ClaudeOpinionWriter::new(&config.anthropic_api_key));
    let judge: Arc<dyn AlignmentJudge> = Arc::new(ClaudeJudge::new(&config.anthropic_api_key));

    let pipeline = Pipeline::new(run_config, fetcher, truncator, generator, judge);
    let stats = pipeline.run().await?;

    info!("Run complete. {stats}");
    Ok(())
}
