//! Conversation history summarization

use super::{ConversationState, Role, Turn};
use crate::llm::{ChatMessage, CompletionClient};

/// Turns retained verbatim after a summarization pass
const HISTORY_WINDOW: usize = 2;

/// Condense the conversation into the running summary and prune the turn
/// list to a bounded window. The newest turn (the answer just produced) is
/// excluded from the material being summarized. A completion failure keeps
/// the previous summary and leaves the turns untouched.
pub async fn summarize_history(client: &dyn CompletionClient, state: &mut ConversationState) {
    if state.turns.len() <= 1 {
        return;
    }

    let transcript = render_transcript(&state.turns[..state.turns.len() - 1]);

    let prompt = if state.summary.is_empty() {
        format!(
            r#"The following is a conversation between a user and an AI assistant.
Summarize the key context and important facts so the conversation can continue later.
Skip greetings and trivia; focus on facts relevant to the knowledge base.

Conversation:
{}"#,
            transcript
        )
    } else {
        format!(
            r#"Previous summary: {}

Fold the new conversation below into the summary. Keep the key context and
important facts, especially user preferences and knowledge-base specifics.

New conversation:
{}"#,
            state.summary, transcript
        )
    };

    match client.complete(vec![ChatMessage::user(prompt)]).await {
        Ok(completion) => {
            state.summary = completion.text;
            // Bounded window: the summary carries the older context
            if state.turns.len() > HISTORY_WINDOW {
                state.turns = state.turns.split_off(state.turns.len() - HISTORY_WINDOW);
            }
        }
        Err(e) => {
            tracing::warn!("history summarization failed: {}, keeping previous summary", e);
        }
    }
}

fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| {
            let speaker = match t.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, t.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
