//! Web search fallback (CRAG)
//!
//! Invoked only when the grader rejects internal evidence. Results carry a
//! synthetic rank-based score, not a true relevance score.

use crate::config::WebSearchConfig;
use crate::error::{RagRootError, Result};
use crate::retrieval::Document;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Web search capability
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web, returning up to `max_results` documents
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Document>>;
}

/// Run the fallback search. The running conversation summary, when present,
/// is prepended to the query for better search context. Any failure returns
/// an empty list; the workflow proceeds with whatever came back.
pub async fn fallback_search(
    web: &dyn WebSearch,
    query: &str,
    summary: &str,
    max_results: usize,
) -> Vec<Document> {
    let search_query = if summary.is_empty() {
        query.to_string()
    } else {
        format!("{} {}", summary, query)
    };

    tracing::info!(
        "internal evidence insufficient, searching the web for: '{}'",
        search_query
    );

    match web.search(&search_query, max_results).await {
        Ok(results) => results
            .into_iter()
            .enumerate()
            .map(|(i, mut doc)| {
                doc.score = 1.0 - i as f64 * 0.1;
                doc
            })
            .collect(),
        Err(e) => {
            tracing::warn!("web search failed: {}", e);
            Vec::new()
        }
    }
}

/// SearxNG-compatible web search client
pub struct HttpWebSearch {
    http_client: reqwest::Client,
    config: WebSearchConfig,
}

#[derive(Deserialize)]
struct SearxResponse {
    results: Vec<SearxResult>,
}

#[derive(Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    url: String,
}

impl HttpWebSearch {
    /// Create new client from configuration
    pub fn new(config: WebSearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RagRootError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(WebSearchConfig::default())
    }
}

#[async_trait]
impl WebSearch for HttpWebSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Document>> {
        let url = format!("{}/search", self.config.url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(RagRootError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RagRootError::WebSearch(format!(
                "search endpoint returned HTTP {}",
                status
            )));
        }

        let searx: SearxResponse = response.json().await.map_err(RagRootError::Http)?;

        Ok(searx
            .results
            .into_iter()
            .take(max_results)
            .map(|r| Document {
                content: format!("{}: {}", r.title, r.content),
                source: r.url,
                score: 0.0,
            })
            .collect())
    }
}
