//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use pane_core::Config;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Load configuration and the directory relative paths in it resolve
/// against.
///
/// An explicit `--config` must exist; otherwise pane.yml or pane.yaml next to
/// `document` is used when present.
pub(crate) fn load_config(global: &GlobalArgs, document: &Path) -> Result<(Config, PathBuf)> {
    match &global.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            Ok((config, parent_dir(path)))
        }
        None => {
            let dir = parent_dir(document);
            let config = Config::load_or_default(&dir)
                .with_context(|| format!("Failed to load config from {}", dir.display()))?;
            Ok((config, dir))
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read a document from disk
pub(crate) fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load a JSON or YAML data file, chosen by extension
pub(crate) fn load_data_file(path: &Path) -> Result<serde_json::Value> {
    let content = read_document(path)?;
    log::debug!("Loading data from {}", path.display());
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}

/// Parse a `KEY=VALUE` assignment. The value is JSON when it parses as JSON,
/// otherwise a plain string.
pub(crate) fn parse_assignment(assignment: &str) -> Result<(String, serde_json::Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty variable name in '{}'", assignment);
    }
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
