//! Planner step for advanced mode

use crate::llm::{ChatMessage, CompletionClient};

/// Produce a short multi-step plan for the query. The plan is generated once
/// per run and never regenerated mid-loop. If the completion call fails, the
/// query itself stands in as a single-step plan so execution can proceed.
pub async fn plan(client: &dyn CompletionClient, query: &str) -> String {
    let prompt = format!(
        r#"You are a strategic planner. If the request below is complex, break it into 2-3 logical steps. If it is simple, restate it as a single step.

User request: {}

Output format:
1. First step...
2. Second step..."#,
        query
    );

    match client.complete(vec![ChatMessage::user(prompt)]).await {
        Ok(completion) => completion.text,
        Err(e) => {
            tracing::warn!("planning failed: {}, using the query as the plan", e);
            query.to_string()
        }
    }
}
