//! Grounded answer generation
//!
//! The workflow must always produce a user-visible message: a completion
//! failure here yields a fixed apology with the error recorded in the
//! answer metadata, never a propagated error.

use crate::llm::{ChatMessage, CompletionClient};
use crate::retrieval::Document;

/// Fixed reply when the generation call itself fails
pub const APOLOGY_TEXT: &str =
    "Sorry, something went wrong while generating the answer. Please try again shortly.";

/// Placeholder evidence line when retrieval and fallback both came back empty
pub const NO_EVIDENCE_TEXT: &str = "No relevant information was found in the knowledge base.";

/// Generated answer plus provider metadata
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub text: String,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    /// Set when the completion call failed and the apology text was used
    pub error: Option<String>,
}

/// Inputs for one generation call
#[derive(Debug, Default)]
pub struct GenerationRequest<'a> {
    pub query: &'a str,
    pub evidence: &'a str,
    /// Evidence came from the web fallback; the answer must disclose it
    pub from_web: bool,
    pub summary: Option<&'a str>,
    pub plan: Option<&'a str>,
    pub critique_feedback: Option<&'a str>,
}

/// Render evidence documents into the context block used for generation
/// and critique
pub fn format_evidence(documents: &[Document]) -> String {
    if documents.is_empty() {
        return NO_EVIDENCE_TEXT.to_string();
    }
    documents
        .iter()
        .map(|d| format!("- {} (Source: {}, Score: {:.2})", d.content, d.source, d.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate an answer for the query against the formatted evidence
pub async fn generate(
    client: &dyn CompletionClient,
    request: &GenerationRequest<'_>,
) -> GeneratedAnswer {
    let mut system = String::from("You are a capable and helpful AI assistant.");

    if let Some(summary) = request.summary.filter(|s| !s.is_empty()) {
        system.push_str("\n\n[Conversation summary]\n");
        system.push_str(summary);
    }

    if request.from_web {
        system.push_str(
            "\n\nCRITICAL: The internal knowledge base had no relevant content, so the \
             evidence below comes from a web search. Begin the answer by disclosing that \
             it is based on web search results.",
        );
    }

    let mut user = String::new();
    if request.from_web {
        user.push_str("[Web search results]\n");
    } else {
        user.push_str("Context:\n");
    }
    user.push_str(request.evidence);

    if let Some(plan) = request.plan.filter(|p| !p.is_empty()) {
        user.push_str("\n\n[Plan]\n");
        user.push_str(plan);
    }

    user.push_str(&format!(
        "\n\n[Instructions]\nAnswer the following question using the context above as \
         your primary source. If the context is insufficient, say politely that the \
         available information cannot answer it. State any assumptions you make.\n\n\
         Question: {}",
        request.query
    ));

    if let Some(feedback) = request.critique_feedback.filter(|f| !f.is_empty()) {
        user.push_str("\n\n[Previous critique]\n");
        user.push_str(feedback);
        user.push_str("\nPlease fix this.");
    }

    let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];

    match client.complete(messages).await {
        Ok(completion) => GeneratedAnswer {
            text: completion.text,
            model: completion.model,
            prompt_tokens: completion.prompt_tokens,
            completion_tokens: completion.completion_tokens,
            error: None,
        },
        Err(e) => {
            tracing::error!("answer generation failed: {}", e);
            GeneratedAnswer {
                text: APOLOGY_TEXT.to_string(),
                model: "error-fallback".to_string(),
                prompt_tokens: None,
                completion_tokens: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagRootError, Result};
    use crate::llm::Completion;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        reply: Option<&'static str>,
        messages: Mutex<Vec<ChatMessage>>,
    }

    impl RecordingClient {
        fn replying(text: &'static str) -> Self {
            Self {
                reply: Some(text),
                messages: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                messages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion> {
            *self.messages.lock().unwrap() = messages;
            match self.reply {
                Some(text) => Ok(Completion {
                    text: text.to_string(),
                    model: "fake".to_string(),
                    prompt_tokens: Some(10),
                    completion_tokens: Some(20),
                }),
                None => Err(RagRootError::Completion("provider down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    #[test]
    fn test_format_evidence() {
        let docs = vec![
            Document::new("fact one", "doc.md", 0.91),
            Document::new("fact two", "web", 0.5),
        ];
        let formatted = format_evidence(&docs);
        assert_eq!(
            formatted,
            "- fact one (Source: doc.md, Score: 0.91)\n- fact two (Source: web, Score: 0.50)"
        );
    }

    #[test]
    fn test_format_empty_evidence_placeholder() {
        assert_eq!(format_evidence(&[]), NO_EVIDENCE_TEXT);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let client = RecordingClient::replying("the answer");
        let request = GenerationRequest {
            query: "what is X?",
            evidence: "- X is Y (Source: a, Score: 0.90)",
            ..Default::default()
        };

        let answer = generate(&client, &request).await;
        assert_eq!(answer.text, "the answer");
        assert_eq!(answer.model, "fake");
        assert_eq!(answer.prompt_tokens, Some(10));
        assert!(answer.error.is_none());
    }

    #[tokio::test]
    async fn test_web_evidence_requires_disclosure() {
        let client = RecordingClient::replying("answer");
        let request = GenerationRequest {
            query: "q",
            evidence: "- hit (Source: https://x, Score: 1.00)",
            from_web: true,
            ..Default::default()
        };

        generate(&client, &request).await;
        let messages = client.messages.lock().unwrap();
        assert!(messages[0].content.contains("web search"));
        assert!(messages[1].content.starts_with("[Web search results]"));
    }

    #[tokio::test]
    async fn test_critique_feedback_appended() {
        let client = RecordingClient::replying("answer");
        let request = GenerationRequest {
            query: "q",
            evidence: "- e (Source: s, Score: 0.90)",
            plan: Some("1. look things up"),
            critique_feedback: Some("the answer ignored the second source"),
            ..Default::default()
        };

        generate(&client, &request).await;
        let messages = client.messages.lock().unwrap();
        let user = &messages[1].content;
        assert!(user.contains("[Plan]"));
        assert!(user.contains("[Previous critique]"));
        assert!(user.contains("Please fix this."));
    }

    #[tokio::test]
    async fn test_summary_in_system_prompt() {
        let client = RecordingClient::replying("answer");
        let request = GenerationRequest {
            query: "q",
            evidence: "- e (Source: s, Score: 0.90)",
            summary: Some("earlier we discussed releases"),
            ..Default::default()
        };

        generate(&client, &request).await;
        let messages = client.messages.lock().unwrap();
        assert!(messages[0].content.contains("[Conversation summary]"));
    }

    #[tokio::test]
    async fn test_failure_yields_apology() {
        let client = RecordingClient::failing();
        let request = GenerationRequest {
            query: "q",
            evidence: NO_EVIDENCE_TEXT,
            ..Default::default()
        };

        let answer = generate(&client, &request).await;
        assert_eq!(answer.text, APOLOGY_TEXT);
        assert_eq!(answer.model, "error-fallback");
        assert!(answer.error.unwrap().contains("provider down"));
    }
}
