//! Advanced-mode workflow: plan, execute, critique loop

use super::{plan, Agent, AdvancedRunOutcome, StepEvent, Turn, MAX_CRITIQUE_ROUNDS};
use crate::critique::{critique, CritiqueResult};
use crate::error::{RagRootError, Result};
use crate::generate::{format_evidence, generate, GenerationRequest};
use crate::retrieval::{retrieve, RetrievalConfig};

/// Critique score at which the answer is accepted
pub const SCORE_PASS_THRESHOLD: f64 = 0.8;

/// Advanced-mode workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedState {
    Plan,
    Execute,
    Critique,
    End,
}

impl AdvancedState {
    pub fn name(self) -> &'static str {
        match self {
            AdvancedState::Plan => "plan",
            AdvancedState::Execute => "execute",
            AdvancedState::Critique => "critique",
            AdvancedState::End => "end",
        }
    }
}

/// Pure transition rule evaluated after every critique: accept on a passing
/// score, give up once the retry budget is spent, otherwise regenerate.
pub fn check_critique(score: f64, retry_count: u32) -> AdvancedState {
    if score >= SCORE_PASS_THRESHOLD {
        return AdvancedState::End;
    }
    if retry_count > MAX_CRITIQUE_ROUNDS - 1 {
        return AdvancedState::End;
    }
    AdvancedState::Execute
}

impl Agent {
    /// Answer a query by planning first and self-correcting the answer until
    /// the critique passes or the retry budget runs out. Terminates within at
    /// most [`MAX_CRITIQUE_ROUNDS`] critique evaluations.
    ///
    /// Prior turns are accepted for interface symmetry with fast mode but do
    /// not influence planning or retrieval.
    pub async fn run_advanced(
        &self,
        query: &str,
        _prior_turns: Vec<Turn>,
        config: RetrievalConfig,
    ) -> Result<AdvancedRunOutcome> {
        if config.top_k == 0 {
            return Err(RagRootError::InvalidInput(
                "retrieval top_k must be at least 1".to_string(),
            ));
        }

        // Advanced mode retrieves on the raw query, without expansion
        let queries = vec![query.to_string()];

        let mut plan_text = String::new();
        let mut retry_count: u32 = 0;
        let mut critique_trace: Vec<CritiqueResult> = Vec::new();
        let mut latest_feedback: Option<String> = None;
        let mut latest_evidence = String::new();
        let mut latest_answer: Option<Turn> = None;

        let mut state = AdvancedState::Plan;
        while state != AdvancedState::End {
            self.emit(StepEvent::NodeEntered { node: state.name() });

            state = match state {
                AdvancedState::Plan => {
                    plan_text = plan(self.completion.as_ref(), query).await;
                    retry_count = 0;
                    AdvancedState::Execute
                }

                AdvancedState::Execute => {
                    let documents = retrieve(
                        self.store.as_ref(),
                        self.completion.as_ref(),
                        &queries,
                        query,
                        &config,
                    )
                    .await;
                    latest_evidence = format_evidence(&documents);

                    let request = GenerationRequest {
                        query,
                        evidence: &latest_evidence,
                        plan: Some(plan_text.as_str()),
                        critique_feedback: latest_feedback.as_deref(),
                        ..Default::default()
                    };
                    let generated = generate(self.completion.as_ref(), &request).await;

                    self.emit(StepEvent::AnswerText {
                        text: generated.text.clone(),
                    });
                    latest_answer = Some(Turn::assistant(generated.text));

                    AdvancedState::Critique
                }

                AdvancedState::Critique => {
                    let answer_text = latest_answer
                        .as_ref()
                        .map(|t| t.text.as_str())
                        .unwrap_or_default();
                    let result =
                        critique(self.completion.as_ref(), &latest_evidence, answer_text).await;
                    retry_count += 1;

                    tracing::debug!(
                        "critique round {}: score={:.2}",
                        retry_count,
                        result.score
                    );

                    let next = check_critique(result.score, retry_count);
                    latest_feedback = Some(result.feedback.clone());
                    critique_trace.push(result);
                    next
                }

                // Unreachable: loop condition
                AdvancedState::End => AdvancedState::End,
            };
        }

        let answer = latest_answer.ok_or_else(|| {
            RagRootError::Other(anyhow::anyhow!("traversal ended without answer"))
        })?;

        Ok(AdvancedRunOutcome {
            answer,
            critique_trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_score_ends() {
        assert_eq!(check_critique(0.8, 1), AdvancedState::End);
        assert_eq!(check_critique(0.95, 3), AdvancedState::End);
    }

    #[test]
    fn test_low_score_retries_within_budget() {
        assert_eq!(check_critique(0.3, 1), AdvancedState::Execute);
        assert_eq!(check_critique(0.79, 2), AdvancedState::Execute);
    }

    #[test]
    fn test_budget_exhaustion_gives_up() {
        assert_eq!(check_critique(0.3, 3), AdvancedState::End);
        assert_eq!(check_critique(0.0, 4), AdvancedState::End);
    }

    #[test]
    fn test_out_of_range_scores_handled() {
        // Consumers treat out-of-range scores defensively: an inflated score
        // passes, a negative one just retries until the budget is spent
        assert_eq!(check_critique(1.7, 1), AdvancedState::End);
        assert_eq!(check_critique(-0.5, 1), AdvancedState::Execute);
        assert_eq!(check_critique(-0.5, 3), AdvancedState::End);
    }
}
