use std::path::Path;

use anyhow::{anyhow, Result};
use tokenizers::Tokenizer;
use tracing::info;

use crate::traits::TokenTruncator;

/// Token budget backed by a HuggingFace `tokenizer.json`.
///
/// Encode → keep the first N ids → decode. A text that already fits the
/// budget is returned byte-identical, without a decode round-trip.
pub struct HfTruncator {
    tokenizer: Tokenizer,
}

impl HfTruncator {
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("load tokenizer {}: {e}", path.display()))?;
        info!(path = %path.display(), "Loaded generation-model tokenizer");
        Ok(Self { tokenizer })
    }
}

impl TokenTruncator for HfTruncator {
    fn truncate(&self, text: &str, max_tokens: usize) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("tokenize: {e}"))?;
        let ids = encoding.get_ids();

        if ids.len() <= max_tokens {
            return Ok(text.to_string());
        }

        self.tokenizer
            .decode(&ids[..max_tokens], true)
            .map_err(|e| anyhow!("detokenize: {e}"))
    }
}
