//! Model and generation configuration.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of preceding tokens used as the n-gram lookup key.
    pub context_size: usize,
    pub embedding_dim: usize,
    /// Residual self-attention layers run (and discarded) per generation step.
    pub attention_layers: usize,
    /// Maximum number of tokens appended to a prompt.
    pub generation_length: usize,
    pub temperature: f64,
    /// Nucleus threshold; values outside (0, 1) fall back to temperature sampling.
    pub top_p: Option<f64>,
    /// Seeds the embedding store; `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            context_size: 3,
            embedding_dim: 64,
            attention_layers: 4,
            generation_length: 15,
            temperature: 0.7,
            top_p: Some(0.9),
            seed: None,
        }
    }
}

impl ModelConfig {
    /// Tiny test config for quick iteration
    pub fn tiny() -> Self {
        Self {
            context_size: 2,
            embedding_dim: 8,
            attention_layers: 1,
            generation_length: 4,
            seed: Some(7),
            ..Self::default()
        }
    }

    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size;
        self
    }

    /// Reads a JSON config; a missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.context_size >= 1, "context_size must be at least 1");
        ensure!(self.embedding_dim >= 1, "embedding_dim must be at least 1");
        ensure!(
            self.temperature.is_finite() && self.temperature > 0.0,
            "temperature must be a positive finite number, got {}",
            self.temperature
        );
        if let Some(top_p) = self.top_p {
            ensure!(
                top_p > 0.0 && top_p <= 1.0,
                "top_p must be in (0, 1], got {}",
                top_p
            );
        }
        Ok(())
    }
}
