use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Fail with a clear message when a required input file is absent
pub fn require_file(path: &Path, description: &str) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("{} not found: {}", description, path.display());
    }
    Ok(())
}

/// Read a text file
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

/// Parse a YAML file into a JSON value tree
pub fn read_yaml_file(path: &Path) -> Result<Value> {
    let content = read_text(path)?;
    parse_yaml(&content).with_context(|| format!("Failed to parse YAML file: {:?}", path))
}

/// Parse a YAML string into a JSON value tree. An empty document is `null`.
pub fn parse_yaml(yaml: &str) -> Result<Value> {
    if yaml.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(yaml).context("Failed to parse YAML")
}

/// Parse a JSON file
pub fn read_json_file(path: &Path) -> Result<Value> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file: {:?}", path))
}
