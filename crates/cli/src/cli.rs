//! CLI wiring for ngramlab.

use crate::dataset::{list_dataset_files, load_texts, resolve_dataset, DEFAULT_DATASET_DIR};
use crate::session::{run_chat_loop, ChatSession};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ngramlab_llm::ModelConfig;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ngramlab", about = "Train an n-gram language model and generate text")]
pub struct Cli {
    /// JSON model configuration; missing fields use the defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective model configuration.
    Defaults {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Train on a dataset file and continue a single prompt.
    Generate {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        prompt: String,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Train on a dataset and answer prompts read from stdin.
    Chat {
        #[arg(long, default_value = DEFAULT_DATASET_DIR)]
        dataset_dir: PathBuf,
        /// File name inside the dataset directory; asked for interactively when absent.
        #[arg(long)]
        dataset: Option<String>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    #[arg(long)]
    pub context_size: Option<usize>,
    #[arg(long)]
    pub embedding_dim: Option<usize>,
    #[arg(long)]
    pub layers: Option<usize>,
    #[arg(long)]
    pub max_tokens: Option<usize>,
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Nucleus threshold; 1.0 disables nucleus filtering.
    #[arg(long)]
    pub top_p: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: ModelConfig) -> Result<ModelConfig> {
        if let Some(value) = self.context_size {
            config.context_size = value;
        }
        if let Some(value) = self.embedding_dim {
            config.embedding_dim = value;
        }
        if let Some(value) = self.layers {
            config.attention_layers = value;
        }
        if let Some(value) = self.max_tokens {
            config.generation_length = value;
        }
        if let Some(value) = self.temperature {
            config.temperature = value;
        }
        if let Some(value) = self.top_p {
            config.top_p = Some(value);
        }
        if let Some(value) = self.seed {
            config.seed = Some(value);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let Cli { config, command } = cli;
    let base = match config {
        Some(path) => ModelConfig::load_from_file(&path)?,
        None => ModelConfig::default(),
    };

    match command {
        Command::Defaults { overrides } => {
            let config = overrides.apply(base)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Generate {
            dataset,
            prompt,
            overrides,
        } => {
            let config = overrides.apply(base)?;
            let texts = load_texts(&dataset)?;
            let mut session = ChatSession::train(&texts, config)?;
            let generation = session.generate(&prompt)?;

            println!("{}", generation.text);
            info!(
                tokens = generation.metrics.tokens_generated,
                elapsed_ms = generation.metrics.elapsed_ms,
                tokens_per_sec = generation.metrics.tokens_per_sec,
                stop_reason = ?generation.stop_reason,
                "generation complete"
            );
        }
        Command::Chat {
            dataset_dir,
            dataset,
            overrides,
        } => {
            let config = overrides.apply(base)?;
            let stdin = io::stdin();
            let mut input = stdin.lock();

            let choice = match dataset {
                Some(name) => name,
                None => prompt_for_dataset(&dataset_dir, &mut input)?,
            };
            let path = resolve_dataset(&dataset_dir, &choice)?;
            let texts = load_texts(&path)?;

            let context_size = config.context_size;
            let mut session = ChatSession::train(&texts, config)?;
            println!(
                "This is a {context_size}-gram model, so enter at least {context_size} words."
            );
            println!("Type \"exit\" or press Ctrl-D to quit.\n");

            run_chat_loop(&mut session, &mut input, &mut io::stdout())?;
        }
    }
    Ok(())
}

fn prompt_for_dataset(dir: &Path, input: &mut impl BufRead) -> Result<String> {
    let files = list_dataset_files(dir)?;
    println!("Available datasets:");
    for file in &files {
        println!("  {file}");
    }
    print!("Enter a file name or press Enter for the default: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read dataset choice")?;
    Ok(line.trim().to_string())
}
