//! Binary relevance grading over retrieved evidence

use crate::llm::{ChatMessage, CompletionClient};
use crate::retrieval::Document;

/// Judge whether the evidence is sufficient to answer the query.
///
/// Empty evidence is never sufficient and costs no completion call. An
/// ambiguous verdict counts as sufficient, and so does a completion failure:
/// grading fails open so an unreachable provider cannot force the web
/// fallback on every query.
pub async fn grade(client: &dyn CompletionClient, query: &str, documents: &[Document]) -> bool {
    if documents.is_empty() {
        tracing::debug!("grader: no documents retrieved, not relevant");
        return false;
    }

    let evidence: String = documents
        .iter()
        .map(|d| format!("- {}", d.content))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        r#"You are an impartial judge of search relevance.
Compare the question and the retrieved documents below, and decide whether the documents contain the key facts needed to answer the question.
If the documents are unrelated or contain no answer, reply 'no'. Otherwise reply 'yes'. Reply with a single word.

Question: {}

Retrieved documents:
{}

Do the documents contain enough information to answer the question (yes/no):"#,
        query, evidence
    );

    match client.complete(vec![ChatMessage::user(prompt)]).await {
        Ok(completion) => {
            let verdict = completion.text.to_lowercase();
            let verdict = verdict.trim();
            let relevant = if verdict.contains("no") {
                false
            } else {
                // "yes" or anything ambiguous: do not over-trigger the fallback
                true
            };
            tracing::debug!("grader: verdict='{}', relevant={}", verdict, relevant);
            relevant
        }
        Err(e) => {
            tracing::warn!("grading failed: {}, defaulting to relevant", e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagRootError, Result};
    use crate::llm::Completion;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeClient {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeClient {
        fn replying(text: &'static str) -> Self {
            Self {
                reply: Some(text),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(text) => Ok(Completion {
                    text: text.to_string(),
                    model: "fake".to_string(),
                    ..Default::default()
                }),
                None => Err(RagRootError::Completion("down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    fn one_doc() -> Vec<Document> {
        vec![Document::new("some evidence", "s", 0.9)]
    }

    #[tokio::test]
    async fn test_empty_documents_graded_false_without_call() {
        let client = FakeClient::replying("yes");
        assert!(!grade(&client, "unrelated question", &[]).await);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_yes_graded_true() {
        let client = FakeClient::replying("Yes.");
        assert!(grade(&client, "q", &one_doc()).await);
    }

    #[tokio::test]
    async fn test_no_graded_false() {
        let client = FakeClient::replying("no");
        assert!(!grade(&client, "q", &one_doc()).await);
    }

    #[tokio::test]
    async fn test_no_wins_over_yes() {
        let client = FakeClient::replying("yes and no");
        assert!(!grade(&client, "q", &one_doc()).await);
    }

    #[tokio::test]
    async fn test_ambiguous_graded_true() {
        let client = FakeClient::replying("maybe, hard to tell");
        assert!(grade(&client, "q", &one_doc()).await);
    }

    #[tokio::test]
    async fn test_failure_fails_open() {
        let client = FakeClient::failing();
        assert!(grade(&client, "q", &one_doc()).await);
    }
}
