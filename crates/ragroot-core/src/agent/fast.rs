//! Fast-mode workflow: Self-RAG grading with corrective web fallback

use super::{
    summarize_history, Agent, ConversationState, FastRunOutcome, StepEvent, Turn,
    SUMMARIZE_AFTER_TURNS,
};
use crate::error::{RagRootError, Result};
use crate::generate::{format_evidence, generate, GenerationRequest};
use crate::grade::grade;
use crate::llm::expand;
use crate::retrieval::{retrieve, Document, RetrievalConfig};
use crate::web::fallback_search;

/// Extra query variants requested from the expander
const EXPANSION_VARIANTS: usize = 2;

/// Fast-mode workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastState {
    ExpandQuery,
    Retrieve,
    Grade,
    WebSearch,
    Generate,
    Summarize,
    End,
}

impl FastState {
    pub fn name(self) -> &'static str {
        match self {
            FastState::ExpandQuery => "expand_query",
            FastState::Retrieve => "retrieve",
            FastState::Grade => "grade",
            FastState::WebSearch => "web_search",
            FastState::Generate => "generate",
            FastState::Summarize => "summarize",
            FastState::End => "end",
        }
    }
}

/// What a node reports back to the transition function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastSignal {
    Expanded,
    Retrieved,
    Graded { relevant: bool },
    Searched,
    Generated { turn_count: usize },
    Summarized,
}

/// Pure transition function for the fast-mode workflow. Any signal that does
/// not belong to the current state terminates the traversal.
pub fn next_fast_state(state: FastState, signal: FastSignal) -> FastState {
    match (state, signal) {
        (FastState::ExpandQuery, FastSignal::Expanded) => FastState::Retrieve,
        (FastState::Retrieve, FastSignal::Retrieved) => FastState::Grade,
        (FastState::Grade, FastSignal::Graded { relevant: true }) => FastState::Generate,
        (FastState::Grade, FastSignal::Graded { relevant: false }) => FastState::WebSearch,
        (FastState::WebSearch, FastSignal::Searched) => FastState::Generate,
        (FastState::Generate, FastSignal::Generated { turn_count }) => {
            if turn_count > SUMMARIZE_AFTER_TURNS {
                FastState::Summarize
            } else {
                FastState::End
            }
        }
        (FastState::Summarize, FastSignal::Summarized) => FastState::End,
        (state, signal) => {
            tracing::warn!("unexpected signal {:?} in state {:?}", signal, state);
            FastState::End
        }
    }
}

struct FastContext {
    conversation: ConversationState,
    queries: Vec<String>,
    documents: Vec<Document>,
    from_web: bool,
    answer: Option<Turn>,
}

impl Agent {
    /// Answer a query with grading and corrective web fallback.
    ///
    /// The conversation (prior turns + the new user turn) is owned by this
    /// run; the caller gets the answer turn, the possibly-updated summary,
    /// and the evidence the answer was grounded on.
    pub async fn run_fast(
        &self,
        query: &str,
        prior_turns: Vec<Turn>,
        summary: String,
        config: RetrievalConfig,
    ) -> Result<FastRunOutcome> {
        if config.top_k == 0 {
            return Err(RagRootError::InvalidInput(
                "retrieval top_k must be at least 1".to_string(),
            ));
        }

        let mut turns = prior_turns;
        turns.push(Turn::user(query));

        let mut ctx = FastContext {
            conversation: ConversationState {
                turns,
                summary,
                retrieval: config,
            },
            queries: Vec::new(),
            documents: Vec::new(),
            from_web: false,
            answer: None,
        };

        let mut state = FastState::ExpandQuery;
        while state != FastState::End {
            self.emit(StepEvent::NodeEntered { node: state.name() });
            let signal = self.run_fast_node(state, query, &mut ctx).await;
            state = next_fast_state(state, signal);
        }

        let answer = ctx
            .answer
            .ok_or_else(|| RagRootError::Other(anyhow::anyhow!("traversal ended without answer")))?;

        Ok(FastRunOutcome {
            answer,
            updated_summary: ctx.conversation.summary,
            retrieved: ctx.documents,
        })
    }

    async fn run_fast_node(
        &self,
        state: FastState,
        query: &str,
        ctx: &mut FastContext,
    ) -> FastSignal {
        match state {
            FastState::ExpandQuery => {
                // Existing summary gives the expander conversational context
                let expansion_input = if ctx.conversation.summary.is_empty() {
                    query.to_string()
                } else {
                    format!("[Context: {}] {}", ctx.conversation.summary, query)
                };
                ctx.queries =
                    expand(self.completion.as_ref(), &expansion_input, EXPANSION_VARIANTS).await;
                FastSignal::Expanded
            }

            FastState::Retrieve => {
                ctx.documents = retrieve(
                    self.store.as_ref(),
                    self.completion.as_ref(),
                    &ctx.queries,
                    query,
                    &ctx.conversation.retrieval,
                )
                .await;
                FastSignal::Retrieved
            }

            FastState::Grade => {
                let relevant = grade(self.completion.as_ref(), query, &ctx.documents).await;
                FastSignal::Graded { relevant }
            }

            FastState::WebSearch => {
                // Web evidence replaces the rejected internal evidence
                ctx.documents = fallback_search(
                    self.web.as_ref(),
                    query,
                    &ctx.conversation.summary,
                    self.web_max_results,
                )
                .await;
                ctx.from_web = true;
                FastSignal::Searched
            }

            FastState::Generate => {
                let evidence = format_evidence(&ctx.documents);
                let request = GenerationRequest {
                    query,
                    evidence: &evidence,
                    from_web: ctx.from_web,
                    summary: Some(ctx.conversation.summary.as_str()),
                    ..Default::default()
                };
                let generated = generate(self.completion.as_ref(), &request).await;

                self.emit(StepEvent::AnswerText {
                    text: generated.text.clone(),
                });

                let turn = Turn::assistant(generated.text);
                ctx.conversation.turns.push(turn.clone());
                ctx.answer = Some(turn);

                FastSignal::Generated {
                    turn_count: ctx.conversation.turns.len(),
                }
            }

            FastState::Summarize => {
                summarize_history(self.completion.as_ref(), &mut ctx.conversation).await;
                FastSignal::Summarized
            }

            // Unreachable: the interpreter loop exits before entering End
            FastState::End => FastSignal::Summarized,
        }
    }
}
