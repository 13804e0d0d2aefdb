use anyhow::{anyhow, Result};
use std::env;
use std::path::Path;
use tokenizers::tokenizer::Tokenizer;

/// Names a `tokenizer.json` for [`TokenCounter::from_env`], e.g. one exported
/// from the `Xenova/gpt-4o` tokenizer.
pub const TOKENIZER_PATH_ENV: &str = "CHATGPT_TOOLING_TOKENIZER";

/// Approximate token counts. Advisory only, nothing in the request path uses
/// them.
pub struct TokenCounter {
    tokenizer: Tokenizer,
}

impl TokenCounter {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Failed to load tokenizer {}: {}", path.display(), e))?;
        Ok(Self::new(tokenizer))
    }

    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        let tokenizer =
            Tokenizer::from_bytes(bytes).map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        Ok(Self::new(tokenizer))
    }

    pub fn from_env() -> Result<Self> {
        let path = env::var(TOKENIZER_PATH_ENV).map_err(|_| {
            anyhow!(
                "Environment variable '{}' is required but not set.",
                TOKENIZER_PATH_ENV
            )
        })?;
        Self::from_file(path)
    }

    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Failed to encode text: {}", e))?;
        Ok(encoding.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Word-level tokenizer splitting on whitespace and punctuation runs
    pub(crate) const WORD_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "hello": 1, "world": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn test_count_tokens() -> Result<()> {
        let counter = TokenCounter::from_bytes(WORD_TOKENIZER)?;
        assert_eq!(counter.count_tokens("hello world")?, 2);
        assert_eq!(counter.count_tokens("hello, strange world!")?, 5);
        assert_eq!(counter.count_tokens("")?, 0);
        Ok(())
    }

    #[test]
    fn test_invalid_tokenizer() {
        assert!(TokenCounter::from_bytes("{}").is_err());
        assert!(TokenCounter::from_file("/nonexistent/tokenizer.json").is_err());
    }
}
