use std::env;
use std::path::PathBuf;

/// Seconds to sleep before each fetch attempt (including the first).
pub const FETCH_WAIT_SECS: u64 = 1;
/// Fetch attempts per URL before degrading to empty content.
pub const FETCH_RETRIES: u32 = 30;
/// Generation-model tokens kept from each extracted article body.
pub const BODY_TOKEN_BUDGET: usize = 300;
/// Maximum candidates fed into generation per run.
pub const MAX_CANDIDATES: usize = 15;
/// Minimum judge score for a generation attempt to be accepted.
pub const PASS_SCORE: i64 = 80;
/// Generation attempts per candidate before returning the last one as-is.
pub const MAX_TRIES: u32 = 3;
/// Output batch files kept on disk; older ones are pruned.
pub const KEEP_BATCHES: usize = 10;
/// Seconds to pause after each generation cycle (provider rate limit).
pub const PACING_SECS: u64 = 4;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,

    /// RSS/Atom listing the run pulls candidates from.
    pub listing_url: String,

    /// `tokenizer.json` for the generation model's tokenizer.
    pub tokenizer_path: PathBuf,

    pub registry_path: PathBuf,
    pub settings_path: PathBuf,
    pub data_dir: PathBuf,

    // Admin surface
    pub admin_host: String,
    pub admin_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            listing_url: required_env("LISTING_URL"),
            tokenizer_path: path_env("TOKENIZER_PATH", "tokenizer.json"),
            registry_path: path_env("REGISTRY_PATH", "registry.json"),
            settings_path: path_env("SETTINGS_PATH", "settings.json"),
            data_dir: path_env("DATA_DIR", "data"),
            admin_host: env::var("ADMIN_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            admin_port: env::var("ADMIN_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("ADMIN_PORT must be a number"),
        }
    }

    /// Minimal config for the admin surface (no API key or listing needed).
    pub fn admin_from_env() -> Self {
        Self {
            anthropic_api_key: String::new(),
            listing_url: String::new(),
            tokenizer_path: path_env("TOKENIZER_PATH", "tokenizer.json"),
            registry_path: path_env("REGISTRY_PATH", "registry.json"),
            settings_path: path_env("SETTINGS_PATH", "settings.json"),
            data_dir: path_env("DATA_DIR", "data"),
            admin_host: env::var("ADMIN_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            admin_port: env::var("ADMIN_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("ADMIN_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn path_env(key: &str, default: &str) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}
