//! Word-level n-gram language model.
//!
//! This crate implements:
//! - a whitespace tokenizer over an append-only vocabulary
//! - sliding-window (context, next token) sample construction
//! - an exact-match n-gram frequency table
//! - temperature and nucleus (top-p) samplers with an injectable random source
//! - a generation loop that also runs residual self-attention over random
//!   token embeddings
//!
//! The attention output is illustrative only. Prediction comes entirely from
//! the n-gram counts; the attention result is computed each step and dropped.

pub mod config;
pub mod context;
pub mod embeddings;
pub mod model;
pub mod ngram;
pub mod sampler;
pub mod tokenizer;
pub mod vocabulary;

pub use config::ModelConfig;
pub use context::{build_samples, TrainingSample};
pub use embeddings::EmbeddingStore;
pub use model::{Generation, GenerationMetrics, GenerationOptions, LanguageModel, StopReason};
pub use ngram::{ContextKey, FrequencyDistribution, NgramModel};
pub use sampler::{sample, sample_with_nucleus, sample_with_temperature, RandomSource};
pub use tokenizer::WordTokenizer;
pub use vocabulary::{TokenId, Vocabulary};
