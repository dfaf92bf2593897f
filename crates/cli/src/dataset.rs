//! Training corpus discovery and loading.
//!
//! A dataset directory holds plain-text (`.txt`, one document per non-blank
//! line) or JSON-lines (`.jsonl`, one object per line with a string `text`
//! field) files.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_DATASET_DIR: &str = "dataset";
pub const DEFAULT_DATASET: &str = "default.txt";

const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "jsonl"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Sorted file names of every supported dataset in `dir`.
pub fn list_dataset_files(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read dataset directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                files.push(name.to_string());
            }
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no .txt or .jsonl files found in {}", dir.display());
    }
    Ok(files)
}

/// The default file if present, otherwise the first listed one.
pub fn default_dataset(files: &[String]) -> Option<&str> {
    files
        .iter()
        .find(|file| file.as_str() == DEFAULT_DATASET)
        .or_else(|| files.first())
        .map(String::as_str)
}

/// Maps a user choice to a dataset path. A blank choice selects the default; an
/// unknown name is reported and also falls back to the default.
pub fn resolve_dataset(dir: &Path, choice: &str) -> Result<PathBuf> {
    let files = list_dataset_files(dir)?;
    let fallback = default_dataset(&files).context("dataset directory is empty")?;
    let choice = choice.trim();

    if choice.is_empty() {
        info!(dataset = fallback, "using default dataset");
        return Ok(dir.join(fallback));
    }
    if files.iter().any(|file| file == choice) {
        return Ok(dir.join(choice));
    }

    warn!(requested = choice, fallback, "dataset not found, using default");
    Ok(dir.join(fallback))
}

/// Reads every training document from `path`.
pub fn load_texts(path: &Path) -> Result<Vec<String>> {
    let blob = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;

    let texts = match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt") => blob
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>(),
        Some("jsonl") => parse_json_lines(&blob, path)?,
        _ => bail!(
            "unsupported dataset format {} (expected .txt or .jsonl)",
            path.display()
        ),
    };

    info!(path = %path.display(), texts = texts.len(), "dataset loaded");
    Ok(texts)
}

fn parse_json_lines(blob: &str, path: &Path) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    let mut skipped = 0usize;
    for (line_no, line) in blob.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(line).with_context(|| {
            format!("invalid JSON on line {} of {}", line_no + 1, path.display())
        })?;
        match record.get("text").and_then(Value::as_str) {
            Some(text) => texts.push(text.to_string()),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "records without a string `text` field were ignored");
    }
    Ok(texts)
}
