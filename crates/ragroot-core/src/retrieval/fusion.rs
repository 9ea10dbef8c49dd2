//! Multi-query fan-out retrieval with fusion

use super::{dedup_by_content, llm_rerank, Document, RetrievalConfig, SearchType};
use crate::llm::CompletionClient;
use crate::store::EvidenceStore;
use futures::future::join_all;
use std::collections::HashMap;
use std::collections::HashSet;

/// Retrieve evidence for a set of query variants.
///
/// Issues one store call per variant concurrently, deduplicates by content,
/// reranks when requested (or when over-fetching produced more candidates
/// than `top_k`), and applies the score threshold last. Store failures for a
/// variant degrade to an empty list for that variant; the call never fails.
pub async fn retrieve(
    store: &dyn EvidenceStore,
    client: &dyn CompletionClient,
    queries: &[String],
    original_query: &str,
    config: &RetrievalConfig,
) -> Vec<Document> {
    if queries.is_empty() {
        return Vec::new();
    }

    // Over-fetch to compensate for fusion and rerank discarding candidates
    let fetch_k = if config.use_reranker {
        config.top_k * 3
    } else if queries.len() > 1 {
        config.top_k * 2
    } else {
        config.top_k
    };

    let fetches = queries.iter().map(|q| {
        search_variant(
            store,
            q,
            config.search_type,
            fetch_k,
            config.metadata_filter.as_ref(),
        )
    });
    let per_variant = join_all(fetches).await;

    let all_docs: Vec<Document> = per_variant.into_iter().flatten().collect();
    let mut docs = dedup_by_content(all_docs);

    if docs.is_empty() {
        return Vec::new();
    }

    if config.use_reranker || docs.len() > config.top_k {
        docs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        docs = llm_rerank(client, original_query, &docs, config.top_k).await;
    } else {
        docs.truncate(config.top_k);
    }

    docs.retain(|d| d.score >= config.score_threshold);
    docs
}

/// One store call for one query variant. Under hybrid search the keyword and
/// vector sub-retrievals run in parallel and keyword hits are kept ahead of
/// same-content vector hits.
async fn search_variant(
    store: &dyn EvidenceStore,
    query: &str,
    search_type: SearchType,
    limit: usize,
    filter: Option<&HashMap<String, String>>,
) -> Vec<Document> {
    let result = match search_type {
        SearchType::Vector => store.vector_search(query, limit, filter).await,
        SearchType::Keyword => store.keyword_search(query, limit, filter).await,
        SearchType::Graph => store.graph_search(query).await,
        SearchType::Hybrid => {
            let (keyword, vector) = tokio::join!(
                store.keyword_search(query, limit, filter),
                store.vector_search(query, limit, filter),
            );
            merge_hybrid(keyword, vector, limit)
        }
    };

    match result {
        Ok(docs) => docs,
        Err(e) => {
            tracing::warn!("retrieval failed for variant '{}': {}", query, e);
            Vec::new()
        }
    }
}

/// Keyword matches are assumed exact and take priority over vector matches
/// with the same content; either leg failing degrades to its empty list.
fn merge_hybrid(
    keyword: crate::error::Result<Vec<Document>>,
    vector: crate::error::Result<Vec<Document>>,
    limit: usize,
) -> crate::error::Result<Vec<Document>> {
    let keyword = keyword.unwrap_or_else(|e| {
        tracing::warn!("keyword leg of hybrid search failed: {}", e);
        Vec::new()
    });
    let vector = vector.unwrap_or_else(|e| {
        tracing::warn!("vector leg of hybrid search failed: {}", e);
        Vec::new()
    });

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for doc in keyword.into_iter().chain(vector) {
        if seen.insert(doc.content.clone()) {
            merged.push(doc);
        }
    }
    merged.truncate(limit);
    Ok(merged)
}
