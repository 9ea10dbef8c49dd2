//! Evidence store capability
//!
//! The store owns its own indexes and embeddings; the core only issues
//! search calls. An absent collection behaves as "no results", not an error.

use crate::config::StoreServiceConfig;
use crate::error::{RagRootError, Result};
use crate::retrieval::{Document, SearchType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Vector + keyword store capability consumed by the retrieval engine
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Semantic similarity search
    async fn vector_search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Document>>;

    /// Exact-match keyword search
    async fn keyword_search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Document>>;

    /// Knowledge-graph query; the synthesized answer comes back as a single
    /// document with score 1.0
    async fn graph_search(&self, query: &str) -> Result<Vec<Document>>;
}

/// HTTP evidence store client
pub struct HttpEvidenceStore {
    http_client: reqwest::Client,
    config: StoreServiceConfig,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_type: SearchType,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a HashMap<String, String>>,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    content: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    score: f64,
}

impl HttpEvidenceStore {
    /// Create new store client from configuration
    pub fn new(config: StoreServiceConfig) -> Result<Self> {
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
        Self::new(StoreServiceConfig::default())
    }

    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Document>> {
        let url = format!(
            "{}/collections/{}/search",
            self.config.url, self.config.collection
        );

        let request = SearchRequest {
            query,
            search_type,
            limit,
            filter,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(RagRootError::Http)?;

        // Missing collection is "no results", not a failure
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(
                "collection '{}' not found, returning no results",
                self.config.collection
            );
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagRootError::Store(format!(
                "store error (HTTP {}): {}",
                status, body
            )));
        }

        let search_response: SearchResponse = response.json().await.map_err(RagRootError::Http)?;

        Ok(search_response
            .results
            .into_iter()
            .map(|hit| Document {
                content: hit.content,
                source: hit.source.unwrap_or_else(|| "unknown".to_string()),
                score: hit.score,
            })
            .collect())
    }
}

#[async_trait]
impl EvidenceStore for HttpEvidenceStore {
    async fn vector_search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Document>> {
        self.search(query, SearchType::Vector, limit, filter).await
    }

    async fn keyword_search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<Document>> {
        self.search(query, SearchType::Keyword, limit, filter).await
    }

    async fn graph_search(&self, query: &str) -> Result<Vec<Document>> {
        let docs = self.search(query, SearchType::Graph, 1, None).await?;
        Ok(docs
            .into_iter()
            .map(|d| Document {
                score: 1.0,
                source: "knowledge-graph".to_string(),
                ..d
            })
            .collect())
    }
}
