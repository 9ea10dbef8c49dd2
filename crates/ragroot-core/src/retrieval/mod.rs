//! Retrieval fusion engine
//!
//! Provides:
//! - Multi-query fan-out retrieval with content-level deduplication
//! - Keyword-first hybrid merging
//! - Optional LLM reranking with pass-through fallback
//! - Score-threshold and top-k enforcement

mod fusion;
mod rerank;

pub use fusion::retrieve;
pub use rerank::llm_rerank;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A retrieved evidence document. Dedup identity is `content` equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
    /// Higher is more relevant; vector scores are conventionally 0-1,
    /// keyword and synthetic web scores are rank-based.
    pub score: f64,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            score,
        }
    }
}

/// Which retrieval mode the store should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Vector,
    Keyword,
    Hybrid,
    Graph,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchType::Vector => "vector",
            SearchType::Keyword => "keyword",
            SearchType::Hybrid => "hybrid",
            SearchType::Graph => "graph",
        };
        write!(f, "{}", s)
    }
}

/// Retrieval settings for one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum evidence items retained after fusion/rerank (must be >= 1)
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Rerank fused candidates with a completion call
    #[serde(default)]
    pub use_reranker: bool,

    /// Retrieval mode
    #[serde(default)]
    pub search_type: SearchType,

    /// Minimum score for a document to be retained
    #[serde(default)]
    pub score_threshold: f64,

    /// Key-value equality constraints applied inside the store
    #[serde(default)]
    pub metadata_filter: Option<HashMap<String, String>>,
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            use_reranker: false,
            search_type: SearchType::default(),
            score_threshold: 0.0,
            metadata_filter: None,
        }
    }
}

/// Deduplicate by exact content equality, keeping first occurrence
pub(crate) fn dedup_by_content(documents: Vec<Document>) -> Vec<Document> {
    let mut seen = std::collections::HashSet::new();
    documents
        .into_iter()
        .filter(|d| seen.insert(d.content.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let docs = vec![
            Document::new("same", "a", 0.9),
            Document::new("other", "b", 0.8),
            Document::new("same", "c", 0.7),
        ];
        let deduped = dedup_by_content(docs);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].source, "a");
        assert_eq!(deduped[1].content, "other");
    }

    #[test]
    fn test_search_type_serde_snake_case() {
        let json = serde_json::to_string(&SearchType::Hybrid).unwrap();
        assert_eq!(json, "\"hybrid\"");
        let parsed: SearchType = serde_json::from_str("\"keyword\"").unwrap();
        assert_eq!(parsed, SearchType::Keyword);
    }

    #[test]
    fn test_retrieval_config_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 3);
        assert!(!config.use_reranker);
        assert_eq!(config.search_type, SearchType::Vector);
        assert_eq!(config.score_threshold, 0.0);
    }
}
