//! Runtime configuration: completion endpoint, timeouts, retry budget,
//! knowledge path, and the expert directory.
//!
//! Defaults are env-driven (`SUPPORT_FLOW_*`); a TOML file can override
//! any field. The directory is loaded once here and treated as immutable
//! configuration for the process lifetime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::contracts::ExpertDirectoryEntry;
use crate::directory;

/// Completion backend endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    /// Base URL up to and including `/v1`.
    pub url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Top-level flow configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub endpoint: Endpoint,
    /// Per-call gateway timeout. Recommended range 10–30s.
    pub timeout_secs: u64,
    /// Transport retries per gateway call (content failures never retry).
    pub max_transport_retries: u32,
    /// Append-only JSONL file the knowledge sink writes to.
    pub knowledge_path: PathBuf,
    /// Read-only expert directory used by the routing stage.
    pub directory: Vec<ExpertDirectoryEntry>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint {
                url: std::env::var("SUPPORT_FLOW_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
                model: std::env::var("SUPPORT_FLOW_MODEL")
                    .unwrap_or_else(|_| "qwen2.5-14b-instruct".into()),
                api_key: std::env::var("SUPPORT_FLOW_API_KEY").ok(),
            },
            timeout_secs: 20,
            max_transport_retries: 2,
            knowledge_path: PathBuf::from("support-knowledge.jsonl"),
            directory: directory::default_directory(),
        }
    }
}

impl FlowConfig {
    /// Load from a TOML file, or fall back to env-driven defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
