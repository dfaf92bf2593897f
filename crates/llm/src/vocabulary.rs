//! Append-only word ↔ token id mapping.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

pub type TokenId = usize;

/// Ids are assigned densely in first-seen order, starting at 0.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    word_to_id: HashMap<String, TokenId>,
    id_to_word: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing id for `word`, or assigns the next one.
    pub fn add(&mut self, word: &str) -> TokenId {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }
        let id = self.id_to_word.len();
        self.word_to_id.insert(word.to_string(), id);
        self.id_to_word.push(word.to_string());
        id
    }

    pub fn encode(&self, word: &str) -> Option<TokenId> {
        self.word_to_id.get(word).copied()
    }

    pub fn decode(&self, id: TokenId) -> Result<&str> {
        self.id_to_word
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("unknown token: {}", id))
    }

    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }
}
