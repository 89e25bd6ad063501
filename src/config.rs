use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// User overrides for the model limit table
///
/// ```json
/// { "defaultLimit": 16000, "models": { "local-llama": 8192 } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkerConfig {
    /// Replacement for the fallback limit
    pub default_limit: Option<i64>,
    /// Extra or replaced model limits
    pub models: BTreeMap<String, i64>,
}

impl ChunkerConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("parsing config file: {}", path.display()))
    }

    /// Parse a JSON config document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid config JSON")
    }
}
