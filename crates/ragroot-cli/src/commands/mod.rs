//! CLI command handlers

pub mod agent;
pub mod ask;
pub mod chunk;

use crate::app::{AskArgs, SearchTypeArg};
use anyhow::{bail, Result};
use ragroot_core::{RetrievalConfig, SearchType};
use std::collections::HashMap;

/// Build the per-run retrieval settings: the config file supplies the
/// defaults, explicit CLI flags override them
pub(crate) fn build_retrieval_config(
    args: &AskArgs,
    defaults: &RetrievalConfig,
) -> Result<RetrievalConfig> {
    let metadata_filter = if args.filters.is_empty() {
        defaults.metadata_filter.clone()
    } else {
        let mut map = HashMap::new();
        for pair in &args.filters {
            match pair.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    map.insert(key.to_string(), value.to_string());
                }
                _ => bail!("invalid filter '{}', expected key=value", pair),
            }
        }
        Some(map)
    };

    Ok(RetrievalConfig {
        top_k: args.top_k.unwrap_or(defaults.top_k),
        use_reranker: args.rerank || defaults.use_reranker,
        search_type: match args.search_type {
            Some(SearchTypeArg::Vector) => SearchType::Vector,
            Some(SearchTypeArg::Keyword) => SearchType::Keyword,
            Some(SearchTypeArg::Hybrid) => SearchType::Hybrid,
            Some(SearchTypeArg::Graph) => SearchType::Graph,
            None => defaults.search_type,
        },
        score_threshold: args.min_score.unwrap_or(defaults.score_threshold),
        metadata_filter,
    })
}

/// Join the free-form query words, rejecting an empty question
pub(crate) fn join_query(args: &AskArgs) -> Result<String> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        bail!("no question given");
    }
    Ok(query)
}

/// Drain step events for the verbose workflow trace
pub(crate) fn spawn_trace_printer(
    verbose: bool,
) -> (
    Option<tokio::sync::mpsc::UnboundedSender<ragroot_core::StepEvent>>,
    Option<tokio::task::JoinHandle<()>>,
) {
    if !verbose {
        return (None, None);
    }
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let ragroot_core::StepEvent::NodeEntered { node } = event {
                eprintln!("-> {}", node);
            }
        }
    });
    (Some(tx), Some(handle))
}
