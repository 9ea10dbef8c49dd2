//! Configuration management

use crate::error::{RagRootError, Result};
use crate::retrieval::RetrievalConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion service configuration
    #[serde(default)]
    pub completion: CompletionServiceConfig,

    /// Evidence store configuration
    #[serde(default)]
    pub store: StoreServiceConfig,

    /// Web search fallback configuration
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// Default retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Completion service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CompletionServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGROOT_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("RAGROOT_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Evidence store service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreServiceConfig {
    /// Base URL of the evidence store search API
    pub url: String,

    /// Collection to search
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGROOT_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:6333".to_string()),
            collection: std::env::var("RAGROOT_COLLECTION")
                .unwrap_or_else(|_| default_collection()),
            timeout_secs: default_timeout(),
        }
    }
}

/// Web search fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Base URL of a SearxNG-compatible search endpoint
    pub url: String,

    /// Maximum results to fetch per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGROOT_SEARX_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("RAGROOT_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_collection() -> String {
    "knowledge_base".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_results() -> usize {
    5
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file path (~/.config/ragroot/config.yaml)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yaml")
    }

    /// Validate config invariants
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(RagRootError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
completion:
  url: "http://llm:8000"
  model: "qwen2.5:7b"
store:
  url: "http://store:6333"
  collection: "docs"
retrieval:
  top_k: 5
  use_reranker: true
  search_type: hybrid
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.completion.url, "http://llm:8000");
        assert_eq!(config.store.collection, "docs");
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.retrieval.use_reranker);
    }

    #[test]
    fn test_invalid_top_k_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
retrieval:
  top_k: 0
"#
        )
        .unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(RagRootError::Config(_))));
    }
}
