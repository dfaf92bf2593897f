//! Attention mechanism kernels.
//!
//! Everything here is a pure function of the incoming embeddings: there are no
//! projection weights and nothing is learned. Rows of an embedding matrix are
//! sequence positions, columns are embedding dimensions.

use crate::utils::softmax_inplace;
use anyhow::{ensure, Result};
use ndarray::{Array2, ArrayView2};

/// N×N self-attention weights for N embeddings of dimension D, scaled by
/// `1 / sqrt(D)`.
///
/// An empty sequence yields a 0×0 matrix and a single embedding yields `[[1.0]]`.
/// Zero-width embeddings score every pair as 0, giving uniform rows.
pub fn scaled_self_attention_weights(embeddings: ArrayView2<'_, f32>) -> Array2<f32> {
    let n = embeddings.nrows();
    if n == 0 {
        return Array2::zeros((0, 0));
    }
    let dim = embeddings.ncols().max(1);
    let scale = 1.0 / (dim as f32).sqrt();

    let mut scores = embeddings.dot(&embeddings.t());
    scores *= scale;
    softmax_inplace(scores.view_mut());
    scores
}

/// `weights × embeddings`: every output row is the weighted sum of all input rows.
pub fn apply_attention_weights(
    embeddings: ArrayView2<'_, f32>,
    weights: ArrayView2<'_, f32>,
) -> Result<Array2<f32>> {
    ensure!(
        weights.ncols() == embeddings.nrows(),
        "weights column count {} differs from embedding rows {}",
        weights.ncols(),
        embeddings.nrows()
    );
    Ok(weights.dot(&embeddings))
}

pub fn self_attention(embeddings: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
    let weights = scaled_self_attention_weights(embeddings);
    apply_attention_weights(embeddings, weights.view())
}

/// Stacks `layers` self-attention passes, each added back onto its input
/// (`x = x + attention(x)`). Zero layers returns a copy of the input.
pub fn multi_layer_self_attention(
    embeddings: ArrayView2<'_, f32>,
    layers: usize,
) -> Result<Array2<f32>> {
    let mut current = embeddings.to_owned();
    for _ in 0..layers {
        let attended = self_attention(current.view())?;
        current += &attended;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::row_norms;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Axis};

    #[test]
    fn weights_empty_and_single() {
        let empty = Array2::<f32>::zeros((0, 4));
        assert_eq!(scaled_self_attention_weights(empty.view()).dim(), (0, 0));

        let single = array![[0.6f32, 0.8]];
        let weights = scaled_self_attention_weights(single.view());
        assert_eq!(weights, array![[1.0f32]]);
    }

    #[test]
    fn weights_are_square_and_row_stochastic() {
        let embeddings = array![[1.0f32, 0.5], [0.5, 1.0], [-1.0, 0.2]];
        let weights = scaled_self_attention_weights(embeddings.view());
        assert_eq!(weights.dim(), (3, 3));
        for row in weights.axis_iter(Axis(0)) {
            assert!(row.iter().all(|w| *w >= 0.0));
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn weights_favour_similar_vectors() {
        let embeddings = array![[1.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let weights = scaled_self_attention_weights(embeddings.view());
        assert!(weights[[0, 1]] > weights[[0, 2]]);
    }

    #[test]
    fn weights_use_sqrt_dim_scaling() {
        let embeddings = array![[1.0f32, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 0.0]];
        let weights = scaled_self_attention_weights(embeddings.view());
        // Row 0 scores: [4 / 2, 0] = [2, 0].
        let expected = 1.0 / (1.0 + (-2.0f32).exp());
        assert_abs_diff_eq!(weights[[0, 0]], expected, epsilon = 1e-6);
    }

    #[test]
    fn apply_weights_is_matrix_product() {
        let embeddings = array![[1.0f32, 2.0], [3.0, 4.0]];
        let weights = array![[0.5f32, 0.5], [0.0, 1.0]];
        let output = apply_attention_weights(embeddings.view(), weights.view()).unwrap();
        assert_eq!(output, array![[2.0f32, 3.0], [3.0, 4.0]]);
    }

    #[test]
    fn apply_weights_rejects_mismatched_shapes() {
        let embeddings = array![[1.0f32, 2.0]];
        let weights = array![[0.5f32, 0.5]];
        assert!(apply_attention_weights(embeddings.view(), weights.view()).is_err());
    }

    #[test]
    fn self_attention_preserves_shape() {
        let embeddings = Array2::from_shape_fn((5, 8), |(i, j)| ((i * 8 + j) as f32).sin());
        let output = self_attention(embeddings.view()).unwrap();
        assert_eq!(output.dim(), (5, 8));
    }

    #[test]
    fn zero_layers_is_identity() {
        let embeddings = array![[0.6f32, 0.8], [1.0, 0.0]];
        let output = multi_layer_self_attention(embeddings.view(), 0).unwrap();
        assert_eq!(output, embeddings);
    }

    #[test]
    fn residual_layers_grow_row_norms() {
        let embeddings = array![[0.6f32, 0.8, 0.0], [0.0, 0.6, 0.8], [0.8, 0.0, 0.6]];
        let mut previous = row_norms(embeddings.view());
        for layers in 1..=4 {
            let output = multi_layer_self_attention(embeddings.view(), layers).unwrap();
            let norms = row_norms(output.view());
            for (after, before) in norms.iter().zip(previous.iter()) {
                assert!(after > before, "layer {layers}: {after} <= {before}");
            }
            previous = norms;
        }
    }
}
