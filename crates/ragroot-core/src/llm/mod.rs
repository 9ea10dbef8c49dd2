//! Completion service integration
//!
//! Provides:
//! - The `CompletionClient` capability trait consumed by every generation step
//! - An OpenAI-compatible HTTP implementation
//! - Multi-query expansion

mod client;
mod expander;

pub use client::{ChatMessage, Completion, CompletionClient, HttpCompletionClient};
pub use expander::expand;
