//! LLM reranking with pass-through fallback

use super::Document;
use crate::llm::{ChatMessage, CompletionClient};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref INDEX_RE: Regex = Regex::new(r"\d+").expect("valid regex");
}

/// Rerank candidates with one completion call.
///
/// The model is asked for the `top_k` most relevant candidate indices,
/// comma-separated, most relevant first. Out-of-range and repeated indices
/// are discarded. On any failure, or when nothing parseable survives, the
/// input order truncated to `top_k` is returned; reranking never fails the
/// retrieval.
pub async fn llm_rerank(
    client: &dyn CompletionClient,
    query: &str,
    documents: &[Document],
    top_k: usize,
) -> Vec<Document> {
    if documents.is_empty() {
        return Vec::new();
    }

    let mut doc_list = String::new();
    for (idx, doc) in documents.iter().enumerate() {
        doc_list.push_str(&format!("[{}] {}\n", idx, doc.content));
    }

    let prompt = format!(
        r#"Order the documents below by relevance to the search query.
List only the index numbers of the {} most relevant documents, comma-separated, most relevant first (example: 2, 0, 1).

Query: {}

Documents:
{}
Ranking (indices only):"#,
        top_k, query, doc_list
    );

    let messages = vec![ChatMessage::user(prompt)];

    match client.complete(messages).await {
        Ok(completion) => {
            let mut seen = HashSet::new();
            let reranked: Vec<Document> = INDEX_RE
                .find_iter(&completion.text)
                .filter_map(|m| m.as_str().parse::<usize>().ok())
                .filter(|&idx| idx < documents.len() && seen.insert(idx))
                .map(|idx| documents[idx].clone())
                .take(top_k)
                .collect();

            if reranked.is_empty() {
                tracing::warn!("reranker returned no usable indices, keeping input order");
                documents.iter().take(top_k).cloned().collect()
            } else {
                reranked
            }
        }
        Err(e) => {
            tracing::warn!("reranking failed: {}, keeping input order", e);
            documents.iter().take(top_k).cloned().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagRootError, Result};
    use crate::llm::Completion;
    use async_trait::async_trait;

    struct FakeClient {
        response: Result<&'static str>,
    }

    impl FakeClient {
        fn replying(text: &'static str) -> Self {
            Self { response: Ok(text) }
        }

        fn failing() -> Self {
            Self {
                response: Err(RagRootError::Completion("down".to_string())),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<Completion> {
            match &self.response {
                Ok(text) => Ok(Completion {
                    text: text.to_string(),
                    model: "fake".to_string(),
                    ..Default::default()
                }),
                Err(_) => Err(RagRootError::Completion("down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(format!("doc{}", i), "s", 1.0 - i as f64 * 0.1))
            .collect()
    }

    #[tokio::test]
    async fn test_rerank_preserves_model_order() {
        let client = FakeClient::replying("2, 0, 1");
        let result = llm_rerank(&client, "q", &docs(3), 3).await;
        let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["doc2", "doc0", "doc1"]);
    }

    #[tokio::test]
    async fn test_rerank_filters_out_of_range_indices() {
        let client = FakeClient::replying("7, 1, 99, 0");
        let result = llm_rerank(&client, "q", &docs(3), 3).await;
        let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["doc1", "doc0"]);
    }

    #[tokio::test]
    async fn test_rerank_drops_repeated_indices() {
        let client = FakeClient::replying("1, 1, 1, 0");
        let result = llm_rerank(&client, "q", &docs(3), 3).await;
        let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["doc1", "doc0"]);
    }

    #[tokio::test]
    async fn test_rerank_truncates_to_top_k() {
        let client = FakeClient::replying("0, 1, 2, 3, 4");
        let result = llm_rerank(&client, "q", &docs(5), 2).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_unparsable_response_falls_back() {
        let client = FakeClient::replying("I cannot rank these documents.");
        let result = llm_rerank(&client, "q", &docs(4), 2).await;
        let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["doc0", "doc1"]);
    }

    #[tokio::test]
    async fn test_completion_failure_falls_back() {
        let client = FakeClient::failing();
        let result = llm_rerank(&client, "q", &docs(4), 3).await;
        let contents: Vec<&str> = result.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["doc0", "doc1", "doc2"]);
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty() {
        let client = FakeClient::replying("0, 1");
        let result = llm_rerank(&client, "q", &[], 3).await;
        assert!(result.is_empty());
    }
}
