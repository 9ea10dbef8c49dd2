//! Advanced-mode question answering

use super::{build_retrieval_config, join_query, spawn_trace_printer};
use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use ragroot_core::{Agent, CritiqueResult, RetrievalConfig};
use serde::Serialize;

#[derive(Serialize)]
struct AgentOutput<'a> {
    answer: &'a str,
    critique_rounds: usize,
    critiques: &'a [CritiqueResult],
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

    let outcome = agent.run_advanced(&query, Vec::new(), config).await?;
    if let Some(handle) = trace {
        handle.abort();
    }

    match format {
        OutputFormat::Json => {
            let output = AgentOutput {
                answer: &outcome.answer.text,
                critique_rounds: outcome.critique_trace.len(),
                critiques: &outcome.critique_trace,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("{}", outcome.answer.text);
            if verbose && !outcome.critique_trace.is_empty() {
                eprintln!();
                for (round, critique) in outcome.critique_trace.iter().enumerate() {
                    eprintln!("critique round {}: score {:.2}", round + 1, critique.score);
                }
            }
        }
    }

    Ok(())
}
