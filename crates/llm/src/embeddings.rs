//! Lazily initialised random token embeddings.

use crate::vocabulary::TokenId;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;

/// Owned token → unit vector table.
///
/// Vectors are drawn once per token with components uniform in [-1, 1) and
/// normalised to unit length, then never change.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    dim: usize,
    table: HashMap<TokenId, Array1<f32>>,
    rng: fastrand::Rng,
}

impl EmbeddingStore {
    pub fn new(dim: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            dim,
            table: HashMap::new(),
            rng,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, token: TokenId) -> bool {
        self.table.contains_key(&token)
    }

    /// Draws the vector for `token` unless it already has one.
    pub fn initialize(&mut self, token: TokenId) {
        if self.table.contains_key(&token) {
            return;
        }
        let rng = &mut self.rng;
        let raw = Array1::from_shape_fn(self.dim, |_| rng.f32() * 2.0 - 1.0);
        self.table.insert(token, normalize_to_unit_length(raw));
    }

    pub fn embedding(&mut self, token: TokenId) -> ArrayView1<'_, f32> {
        self.initialize(token);
        self.table[&token].view()
    }

    /// Stacks the embeddings of `tokens` as rows of a (len, dim) matrix.
    pub fn embed_sequence(&mut self, tokens: &[TokenId]) -> Array2<f32> {
        let mut output = Array2::<f32>::zeros((tokens.len(), self.dim));
        for (row, &token) in tokens.iter().enumerate() {
            self.initialize(token);
            output.row_mut(row).assign(&self.table[&token]);
        }
        output
    }
}

fn normalize_to_unit_length(vector: Array1<f32>) -> Array1<f32> {
    let magnitude = vector.dot(&vector).sqrt();
    if magnitude == 0.0 {
        return vector;
    }
    vector / magnitude
}
