//! Answer critique for the self-correction loop

use crate::llm::{ChatMessage, CompletionClient};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref SCORE_RE: Regex = Regex::new(r"\[SCORE\]:\s*([0-9.]+)").expect("valid regex");
}

/// Neutral score used when the model's verdict cannot be parsed: favors one
/// retry over a false pass or a false failure
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Faithfulness verdict for a generated answer
#[derive(Debug, Clone, Serialize)]
pub struct CritiqueResult {
    /// Intended range 0.0-1.0; consumers must treat out-of-range values defensively
    pub score: f64,
    pub feedback: String,
}

/// Score an answer for faithfulness to the evidence it was generated from.
///
/// The model is asked for a fixed two-line `[SCORE]` / `[FEEDBACK]` format.
/// An unparsable score becomes [`NEUTRAL_SCORE`]; the raw response text is
/// kept as feedback in all cases. A completion failure also scores neutral,
/// so the bounded retry loop still terminates.
pub async fn critique(
    client: &dyn CompletionClient,
    evidence: &str,
    answer: &str,
) -> CritiqueResult {
    let prompt = format!(
        r#"You are a critic. Verify that the answer is fully supported by the context.

Context:
{}

Answer:
{}

Criteria:
1. No hallucinations.
2. Every claim grounded in the context.

Output format:
[SCORE]: 0.0 to 1.0 (1.0 is perfect)
[FEEDBACK]: a short critique."#,
        evidence, answer
    );

    match client.complete(vec![ChatMessage::user(prompt)]).await {
        Ok(completion) => {
            let score = SCORE_RE
                .captures(&completion.text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(NEUTRAL_SCORE);

            CritiqueResult {
                score,
                feedback: completion.text,
            }
        }
        Err(e) => {
            tracing::warn!("critique failed: {}, scoring neutral", e);
            CritiqueResult {
                score: NEUTRAL_SCORE,
                feedback: format!("critique unavailable: {}", e),
            }
        }
    }
}
