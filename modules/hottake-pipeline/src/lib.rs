pub mod collector;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod generate;
pub mod judge;
pub mod opinion;
pub mod output;
pub mod readability;
pub mod run;
pub mod tagger;
pub mod tokenizer;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use generate::{ConstrainedGenerator, GenerationOutcome};
pub use run::{Pipeline, RunConfig, RunStats};
