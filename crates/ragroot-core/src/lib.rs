//! RagRoot Core Library
//!
//! Core functionality for the ragroot retrieval-augmented answering engine.
//!
//! # Features
//! - Fast mode: query expansion, multi-query retrieval, relevance grading,
//!   and corrective web-search fallback
//! - Advanced mode: plan / execute / critique loop with a bounded retry budget
//! - Multi-query retrieval fusion with LLM reranking
//! - Recursive character text splitting with configurable overlap

pub mod agent;
pub mod chunk;
pub mod config;
pub mod critique;
pub mod error;
pub mod generate;
pub mod grade;
pub mod llm;
pub mod retrieval;
pub mod store;
pub mod web;

pub use agent::{
    Agent, AdvancedRunOutcome, ConversationState, FastRunOutcome, Role, StepEvent, Turn,
    MAX_CRITIQUE_ROUNDS, SUMMARIZE_AFTER_TURNS,
};
pub use chunk::{split_text, split_with_preset, Chunk, ChunkPreset};
pub use config::{CompletionServiceConfig, Config, StoreServiceConfig, WebSearchConfig};
pub use critique::{critique, CritiqueResult};
pub use error::{RagRootError, Result};
pub use generate::{format_evidence, generate, GeneratedAnswer, GenerationRequest};
pub use grade::grade;
pub use llm::{ChatMessage, Completion, CompletionClient, HttpCompletionClient};
pub use retrieval::{llm_rerank, retrieve, Document, RetrievalConfig, SearchType};
pub use store::{EvidenceStore, HttpEvidenceStore};
pub use web::{fallback_search, HttpWebSearch, WebSearch};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ragroot";
