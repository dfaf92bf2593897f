//! Trained language model: vocabulary, n-gram table and embeddings together.

use crate::config::ModelConfig;
use crate::context::build_samples;
use crate::embeddings::EmbeddingStore;
use crate::ngram::NgramModel;
use crate::sampler::{check_temperature, sample, RandomSource};
use crate::tokenizer::WordTokenizer;
use crate::vocabulary::{TokenId, Vocabulary};
use anyhow::Result;
use ngramlab_kernels::attention::multi_layer_self_attention;
use ngramlab_kernels::utils::frobenius_norm;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

pub struct LanguageModel {
    config: ModelConfig,
    tokenizer: WordTokenizer,
    ngram: NgramModel,
    embeddings: EmbeddingStore,
    summary: TrainingSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub documents: usize,
    pub tokens: usize,
    pub samples: usize,
    pub contexts: usize,
    pub vocab_size: usize,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_new_tokens: usize,
    pub temperature: f64,
    pub top_p: Option<f64>,
}

impl GenerationOptions {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            max_new_tokens: config.generation_length,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    /// Rejects a temperature the samplers would refuse, so the error does not
    /// depend on whether the first lookup hits.
    pub fn validate(&self) -> Result<()> {
        check_temperature(self.temperature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// `max_new_tokens` tokens were produced.
    LengthBudget,
    /// The current context window never appeared in training.
    ContextMiss,
    /// The sampler had nothing to choose from.
    EmptyDistribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationMetrics {
    pub tokens_generated: usize,
    pub elapsed_ms: f64,
    pub tokens_per_sec: f64,
}

#[derive(Debug, Clone)]
pub struct Generation {
    /// Prompt words followed by the generated words, single-space separated.
    pub text: String,
    /// Generated token ids only (the prompt is not repeated).
    pub tokens: Vec<TokenId>,
    pub stop_reason: StopReason,
    pub metrics: GenerationMetrics,
}

impl LanguageModel {
    /// Builds the vocabulary, trains the n-gram table in one pass and seeds an
    /// embedding for every token seen in a training sample.
    ///
    /// Each text is windowed on its own, so no sample spans two texts.
    pub fn train<S: AsRef<str>>(texts: &[S], config: ModelConfig) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let mut tokenizer = WordTokenizer::new();
        let mut samples = Vec::new();
        let mut tokens = 0;
        for text in texts {
            let ids = tokenizer.encode_for_training(text.as_ref());
            tokens += ids.len();
            samples.extend(build_samples(&ids, config.context_size));
        }

        let mut ngram = NgramModel::new();
        ngram.train(&samples);

        let mut embeddings = EmbeddingStore::new(config.embedding_dim, config.seed);
        for sample in &samples {
            for &token in &sample.context {
                embeddings.initialize(token);
            }
            embeddings.initialize(sample.next);
        }

        let summary = TrainingSummary {
            documents: texts.len(),
            tokens,
            samples: samples.len(),
            contexts: ngram.context_count(),
            vocab_size: tokenizer.vocabulary().len(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            context_size = config.context_size,
            documents = summary.documents,
            tokens = summary.tokens,
            samples = summary.samples,
            contexts = summary.contexts,
            vocab_size = summary.vocab_size,
            elapsed_ms = summary.elapsed_ms,
            "n-gram model trained"
        );

        Ok(Self {
            config,
            tokenizer,
            ngram,
            embeddings,
            summary,
        })
    }

    /// Extends `prompt` one sampled word at a time.
    ///
    /// The context window starts as the last `context_size` prompt tokens and
    /// slides after every step. Each step also runs the residual self-attention
    /// stack over the window's embeddings; that output is only logged and does
    /// not influence which token is chosen. Generation ends when the budget is
    /// spent or the window has no entry in the n-gram table.
    ///
    /// Fails if the temperature is not positive and finite, or if the prompt
    /// contains a word that was not seen during training.
    pub fn generate<R: RandomSource + ?Sized>(
        &mut self,
        prompt: &str,
        options: &GenerationOptions,
        rng: &mut R,
    ) -> Result<Generation> {
        options.validate()?;
        let start = Instant::now();
        let prompt_ids = self.tokenizer.encode(prompt)?;
        let window = self.config.context_size;
        let mut context: Vec<TokenId> =
            prompt_ids[prompt_ids.len().saturating_sub(window)..].to_vec();

        let mut words: Vec<String> = prompt.split_whitespace().map(str::to_string).collect();
        let mut generated = Vec::with_capacity(options.max_new_tokens);
        let mut stop_reason = StopReason::LengthBudget;

        for step in 0..options.max_new_tokens {
            let context_embeddings = self.embeddings.embed_sequence(&context);
            let attended =
                multi_layer_self_attention(context_embeddings.view(), self.config.attention_layers)?;
            debug!(
                step,
                layers = self.config.attention_layers,
                attention_norm = frobenius_norm(attended.view()),
                "attention computed (not used for prediction)"
            );

            let Some(dist) = self.ngram.lookup(&context) else {
                stop_reason = StopReason::ContextMiss;
                break;
            };
            let Some(next) = sample(dist, options.temperature, options.top_p, rng)? else {
                stop_reason = StopReason::EmptyDistribution;
                break;
            };

            words.push(self.tokenizer.vocabulary().decode(next)?.to_string());
            generated.push(next);
            if !context.is_empty() {
                context.remove(0);
            }
            context.push(next);
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let tokens_per_sec = if elapsed_ms > 0.0 {
            (generated.len() as f64 / elapsed_ms) * 1000.0
        } else {
            0.0
        };
        debug!(
            tokens = generated.len(),
            stop_reason = ?stop_reason,
            elapsed_ms,
            "generation finished"
        );

        Ok(Generation {
            text: words.join(" "),
            metrics: GenerationMetrics {
                tokens_generated: generated.len(),
                elapsed_ms,
                tokens_per_sec,
            },
            tokens: generated,
            stop_reason,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn context_size(&self) -> usize {
        self.config.context_size
    }

    pub fn attention_layers(&self) -> usize {
        self.config.attention_layers
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.tokenizer.vocabulary()
    }

    pub fn tokenizer(&self) -> &WordTokenizer {
        &self.tokenizer
    }

    pub fn ngram(&self) -> &NgramModel {
        &self.ngram
    }

    pub fn embeddings(&self) -> &EmbeddingStore {
        &self.embeddings
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }
}
