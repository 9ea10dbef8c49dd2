//! Fast-mode question answering

use super::{build_retrieval_config, join_query, spawn_trace_printer};
use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use ragroot_core::{Agent, RetrievalConfig};
use serde::Serialize;

#[derive(Serialize)]
struct AskOutput<'a> {
    answer: &'a str,
    summary: &'a str,
    sources: Vec<SourceOutput<'a>>,
}

#[derive(Serialize)]
struct SourceOutput<'a> {
    source: &'a str,
    score: f64,
}

pub async fn run(
    args: AskArgs,
    agent: Agent,
    defaults: &RetrievalConfig,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let query = join_query(&args)?;
    let config = build_retrieval_config(&args, defaults)?;

    let (events, trace) = spawn_trace_printer(verbose);
    let agent = match events {
        Some(tx) => agent.with_events(tx),
        None => agent,
    };

    let outcome = agent
        .run_fast(&query, Vec::new(), String::new(), config)
        .await?;
    if let Some(handle) = trace {
        handle.abort();
    }

    match format {
        OutputFormat::Json => {
            let output = AskOutput {
                answer: &outcome.answer.text,
                summary: &outcome.updated_summary,
                sources: outcome
                    .retrieved
                    .iter()
                    .map(|d| SourceOutput {
                        source: &d.source,
                        score: d.score,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("{}", outcome.answer.text);
            if !outcome.retrieved.is_empty() {
                println!();
                println!("Sources:");
                for doc in &outcome.retrieved {
                    println!("  {} ({:.2})", doc.source, doc.score);
                }
            }
        }
    }

    Ok(())
}
