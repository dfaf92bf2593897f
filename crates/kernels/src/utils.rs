//! Shared numeric helpers for the attention kernels.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};
use rayon::prelude::*;

/// Numerically stable softmax over a single score vector.
///
/// The maximum score is subtracted before exponentiating, so inputs far from
/// zero (e.g. `[1000.0, 1001.0]`) stay finite. An empty input yields an empty
/// output and a single score always maps to `1.0`.
pub fn softmax(scores: ArrayView1<'_, f32>) -> Array1<f32> {
    let mut output = scores.to_owned();
    softmax_row_inplace(output.view_mut());
    output
}

/// Row-wise softmax, each row normalised independently.
pub fn softmax_inplace(mut scores: ArrayViewMut2<'_, f32>) {
    scores
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(softmax_row_inplace);
}

fn softmax_row_inplace(mut row: ArrayViewMut1<'_, f32>) {
    if row.is_empty() {
        return;
    }
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    row -= max;
    row.mapv_inplace(|x| x.exp());
    // The max element contributes exp(0) = 1, so the sum is >= 1 for finite input.
    let sum = row.sum();
    row /= sum.max(f32::EPSILON);
}

/// Euclidean norm of every row.
pub fn row_norms(data: ArrayView2<'_, f32>) -> Array1<f32> {
    data.map_axis(Axis(1), |row| row.dot(&row).sqrt())
}

/// Euclidean norm of the whole matrix.
pub fn frobenius_norm(data: ArrayView2<'_, f32>) -> f32 {
    data.iter().map(|x| x * x).sum::<f32>().sqrt()
}
