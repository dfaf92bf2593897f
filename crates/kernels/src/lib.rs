//! Attention kernels for ngramlab.
//!
//! The kernels only illustrate how self-attention mixes token embeddings; the
//! language model computes them during generation and then drops the result.

pub mod attention;
pub mod utils;

pub use attention::*;
pub use utils::*;
