//! Whitespace word tokenizer backed by a growing [`Vocabulary`].
//!
//! Text is lowercased and split on runs of whitespace. Punctuation stays
//! attached to its word, so `"hello,"` and `"hello"` are distinct tokens.

use crate::vocabulary::{TokenId, Vocabulary};
use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    vocab: Vocabulary,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizes training text, adding unseen words to the vocabulary.
    pub fn encode_for_training(&mut self, text: &str) -> Vec<TokenId> {
        let lowered = text.to_lowercase();
        lowered
            .split_whitespace()
            .map(|word| self.vocab.add(word))
            .collect()
    }

    /// Tokenizes text against the frozen vocabulary; any unseen word is an error.
    pub fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        text.to_lowercase()
            .split_whitespace()
            .map(|word| {
                self.vocab
                    .encode(word)
                    .ok_or_else(|| anyhow!("unknown word: {}", word))
            })
            .collect()
    }

    pub fn decode(&self, ids: &[TokenId]) -> Result<String> {
        let words = ids
            .iter()
            .map(|&id| self.vocab.decode(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(words.join(" "))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}
