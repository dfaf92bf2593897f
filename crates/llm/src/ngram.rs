//! Exact-match n-gram frequency table.
//!
//! Maps an ordered context window to the counts of every token observed right
//! after it. The table only grows: counts increase and entries are added, never
//! removed.

use crate::context::TrainingSample;
use crate::vocabulary::TokenId;
use std::borrow::Borrow;
use std::collections::HashMap;

/// Ordered token window used as a table key. Equality is elementwise, so
/// `[1, 2]` and `[2, 1]` are different contexts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(Box<[TokenId]>);

impl ContextKey {
    pub fn tokens(&self) -> &[TokenId] {
        &self.0
    }
}

impl From<&[TokenId]> for ContextKey {
    fn from(tokens: &[TokenId]) -> Self {
        Self(tokens.into())
    }
}

impl Borrow<[TokenId]> for ContextKey {
    fn borrow(&self) -> &[TokenId] {
        &self.0
    }
}

/// Next-token counts for one context, kept in first-seen order so ties during
/// sampling resolve the same way every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyDistribution {
    entries: Vec<(TokenId, u64)>,
    index: HashMap<TokenId, usize>,
}

impl FrequencyDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, token: TokenId) {
        self.add_count(token, 1);
    }

    /// Adds `count` observations of `token`. A zero count is ignored, so every
    /// stored entry has been seen at least once.
    pub fn add_count(&mut self, token: TokenId, count: u64) {
        if count == 0 {
            return;
        }
        match self.index.get(&token) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(token, self.entries.len());
                self.entries.push((token, count));
            }
        }
    }

    pub fn count(&self, token: TokenId) -> Option<u64> {
        self.index.get(&token).map(|&slot| self.entries[slot].1)
    }

    /// (token, count) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, u64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(TokenId, u64)> for FrequencyDistribution {
    fn from_iter<I: IntoIterator<Item = (TokenId, u64)>>(iter: I) -> Self {
        let mut dist = Self::new();
        for (token, count) in iter {
            dist.add_count(token, count);
        }
        dist
    }
}

#[derive(Debug, Clone, Default)]
pub struct NgramModel {
    table: HashMap<ContextKey, FrequencyDistribution>,
}

impl NgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one count of `next` under `context` for every sample. Counts
    /// accumulate across calls.
    pub fn train(&mut self, samples: &[TrainingSample]) {
        for sample in samples {
            self.observe(&sample.context, sample.next);
        }
    }

    pub fn observe(&mut self, context: &[TokenId], next: TokenId) {
        match self.table.get_mut(context) {
            Some(dist) => dist.increment(next),
            None => {
                let mut dist = FrequencyDistribution::new();
                dist.increment(next);
                self.table.insert(ContextKey::from(context), dist);
            }
        }
    }

    /// Distribution for an exact context match, `None` if the context was never seen.
    pub fn lookup(&self, context: &[TokenId]) -> Option<&FrequencyDistribution> {
        self.table.get(context)
    }

    pub fn context_count(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &ContextKey> + '_ {
        self.table.keys()
    }
}
