//! Multi-query expansion to improve retrieval recall

use super::{ChatMessage, CompletionClient};

/// Expand a query into up to `n` extra variants.
///
/// The original query is always the first element. Variants come back one per
/// line; whitespace is trimmed, list markers stripped, empty lines dropped.
/// Completion failures never propagate: the caller gets the original query
/// back as a singleton.
pub async fn expand(client: &dyn CompletionClient, query: &str, n: usize) -> Vec<String> {
    let prompt = format!(
        r#"Generate {} alternative search queries that would retrieve better results for the question below.
Write one query per line, with no numbering and no commentary.

Original question: {}

Queries:"#,
        n, query
    );

    let messages = vec![
        ChatMessage::system(
            "You are a search query expansion expert. Rephrase questions to improve retrieval recall.",
        ),
        ChatMessage::user(prompt),
    ];

    match client.complete(messages).await {
        Ok(completion) => {
            let mut queries: Vec<String> = completion
                .text
                .lines()
                .map(strip_list_marker)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect();

            if !queries.iter().any(|q| q == query) {
                queries.insert(0, query.to_string());
            }
            queries.truncate(n + 1);
            queries
        }
        Err(e) => {
            tracing::warn!("query expansion failed: {}, using original query", e);
            vec![query.to_string()]
        }
    }
}

/// Strip leading "1.", "2)", "-", "*" markers the model sometimes adds.
/// A bare leading number without a list delimiter is left alone.
fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    let without_digits = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() != trimmed.len()
        && (without_digits.starts_with('.') || without_digits.starts_with(')'))
    {
        without_digits[1..].trim_start()
    } else {
        trimmed.trim_start_matches(['-', '*']).trim_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagRootError;
    use crate::llm::Completion;
    use async_trait::async_trait;

    struct FakeClient {
        response: Result<String, String>,
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> crate::error::Result<Completion> {
            match &self.response {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    model: "fake".to_string(),
                    ..Default::default()
                }),
                Err(e) => Err(RagRootError::Completion(e.clone())),
            }
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_expand_includes_original_first() {
        let client = FakeClient {
            response: Ok("variant one\nvariant two".to_string()),
        };
        let queries = expand(&client, "what is X?", 2).await;
        assert_eq!(queries, vec!["what is X?", "variant one", "variant two"]);
    }

    #[tokio::test]
    async fn test_expand_truncates_to_n_plus_one() {
        let client = FakeClient {
            response: Ok("a\nb\nc\nd\ne".to_string()),
        };
        let queries = expand(&client, "q", 2).await;
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "q");
    }

    #[tokio::test]
    async fn test_expand_strips_markers_and_blanks() {
        let client = FakeClient {
            response: Ok("1. first variant\n\n- second variant\n   \n2) third".to_string()),
        };
        let queries = expand(&client, "q", 3).await;
        assert_eq!(
            queries,
            vec!["q", "first variant", "second variant", "third"]
        );
    }

    #[tokio::test]
    async fn test_expand_failure_returns_original() {
        let client = FakeClient {
            response: Err("provider down".to_string()),
        };
        let queries = expand(&client, "what is X?", 2).await;
        assert_eq!(queries, vec!["what is X?"]);
    }

    #[tokio::test]
    async fn test_expand_does_not_duplicate_original() {
        let client = FakeClient {
            response: Ok("what is X?\nvariant".to_string()),
        };
        let queries = expand(&client, "what is X?", 2).await;
        assert_eq!(queries, vec!["what is X?", "variant"]);
    }
}
