//! Sliding-window construction of (context, next token) training pairs.

use crate::vocabulary::TokenId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub context: Vec<TokenId>,
    pub next: TokenId,
}

impl TrainingSample {
    pub fn new(context: Vec<TokenId>, next: TokenId) -> Self {
        Self { context, next }
    }
}

/// One sample per window start `i` in `0..len - window`: context `tokens[i..i + window]`,
/// next `tokens[i + window]`. Sequences no longer than the window yield nothing.
pub fn build_samples(tokens: &[TokenId], window: usize) -> Vec<TrainingSample> {
    if window == 0 {
        return Vec::new();
    }
    // No slice is longer than usize::MAX, so an overflowing span has no windows.
    let Some(span) = window.checked_add(1) else {
        return Vec::new();
    };
    tokens
        .windows(span)
        .map(|chunk| TrainingSample::new(chunk[..window].to_vec(), chunk[window]))
        .collect()
}
