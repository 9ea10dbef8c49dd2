//! Orchestration state machines
//!
//! Two fixed workflow topologies over the same capability set:
//! - fast mode: expand -> retrieve -> grade -> (generate | web fallback ->
//!   generate) -> optional history summarization
//! - advanced mode: plan -> execute -> critique, looping on execute until the
//!   critique passes or the retry budget is spent
//!
//! Both are closed state enums driven by pure transition functions and a
//! small interpreter loop. Every external capability is injected at
//! construction, so the whole pipeline runs against fakes in tests.

mod advanced;
mod fast;
mod planner;
mod summarize;

pub use advanced::{check_critique, AdvancedState, SCORE_PASS_THRESHOLD};
pub use fast::{next_fast_state, FastSignal, FastState};
pub use planner::plan;
pub use summarize::summarize_history;

use crate::critique::CritiqueResult;
use crate::llm::CompletionClient;
use crate::retrieval::{Document, RetrievalConfig};
use crate::store::EvidenceStore;
use crate::web::WebSearch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Maximum critique evaluations per advanced-mode run
pub const MAX_CRITIQUE_ROUNDS: u32 = 3;

/// Fast mode summarizes history once the conversation exceeds this many turns
pub const SUMMARIZE_AFTER_TURNS: usize = 10;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Conversation state owned exclusively by one in-flight run
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub turns: Vec<Turn>,
    pub summary: String,
    pub retrieval: RetrievalConfig,
}

/// Workflow progress notification; observation only, never required for
/// correctness
#[derive(Debug, Clone)]
pub enum StepEvent {
    NodeEntered { node: &'static str },
    /// The complete answer text, emitted once per generation step
    AnswerText { text: String },
}

/// Result of a fast-mode run
#[derive(Debug)]
pub struct FastRunOutcome {
    pub answer: Turn,
    pub updated_summary: String,
    pub retrieved: Vec<Document>,
}

/// Result of an advanced-mode run
#[derive(Debug)]
pub struct AdvancedRunOutcome {
    pub answer: Turn,
    pub critique_trace: Vec<CritiqueResult>,
}

/// The orchestrator. Holds the injected capabilities and runs one workflow
/// traversal at a time over a conversation it exclusively owns.
pub struct Agent {
    pub(crate) completion: Arc<dyn CompletionClient>,
    pub(crate) store: Arc<dyn EvidenceStore>,
    pub(crate) web: Arc<dyn WebSearch>,
    pub(crate) web_max_results: usize,
    pub(crate) events: Option<UnboundedSender<StepEvent>>,
}

impl Agent {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn EvidenceStore>,
        web: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            completion,
            store,
            web,
            web_max_results: 5,
            events: None,
        }
    }

    /// Attach an observation channel for step events
    pub fn with_events(mut self, sender: UnboundedSender<StepEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Override the web fallback result budget
    pub fn with_web_max_results(mut self, max_results: usize) -> Self {
        self.web_max_results = max_results;
        self
    }

    /// A dropped receiver never affects the traversal
    pub(crate) fn emit(&self, event: StepEvent) {
        if let Some(ref sender) = self.events {
            let _ = sender.send(event);
        }
    }
}
