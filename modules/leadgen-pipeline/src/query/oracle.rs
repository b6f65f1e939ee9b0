use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use ai_client::util::{strip_code_blocks, truncate_to_char_boundary};
use leadgen_common::SearchCriteria;

use super::prompt::build_prompt;
use super::{Attempt, QueryMode, QuerySource, QueryStrategy};
use crate::traits::TextCompleter;

/// Asks the text-generation oracle for a search URL. One call, no retries.
pub struct OracleStrategy {
    completer: Arc<dyn TextCompleter>,
}

#[derive(Deserialize)]
struct OracleReply {
    #[serde(rename = "searchUrl", default)]
    search_url: Option<String>,
}

impl OracleStrategy {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }
}

#[async_trait]
impl QueryStrategy for OracleStrategy {
    fn source(&self) -> QuerySource {
        QuerySource::Oracle
    }

    async fn attempt(&self, criteria: &SearchCriteria, mode: QueryMode) -> Attempt {
        let prompt = build_prompt(criteria, mode);
        debug!(?mode, prompt_len = prompt.len(), "Calling query oracle");

        match self.completer.complete(&prompt).await {
            Ok(raw) => parse_reply(&raw),
            Err(e) => Attempt::TryNext(format!("oracle unavailable: {e}")),
        }
    }
}

/// Longest reply excerpt carried into a decline reason.
const REPLY_PREVIEW_BYTES: usize = 200;

fn parse_reply(raw: &str) -> Attempt {
    let reply: OracleReply = match serde_json::from_str(strip_code_blocks(raw).trim()) {
        Ok(reply) => reply,
        Err(e) => {
            return Attempt::TryNext(format!(
                "malformed oracle reply ({e}): {}",
                truncate_to_char_boundary(raw, REPLY_PREVIEW_BYTES)
            ))
        }
    };

    match reply.search_url.map(|url| url.trim().to_string()) {
        Some(url) if !url.is_empty() => Attempt::Resolved(url),
        _ => Attempt::TryNext("oracle reply has no searchUrl".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn fenced_reply_is_unwrapped() {
        let raw = "```json\n{\"searchUrl\": \"https://app.apollo.io/#/people?page=1\"}\n```";
        assert_eq!(
            parse_reply(raw),
            Attempt::Resolved("https://app.apollo.io/#/people?page=1".to_string())
        );
    }

    #[test]
    fn non_json_reply_declines_with_excerpt() {
        let attempt = parse_reply("Sure! Here is your URL");
        assert!(matches!(
            attempt,
            Attempt::TryNext(reason) if reason.ends_with(": Sure! Here is your URL")
        ));
    }

    #[test]
    fn missing_or_blank_url_declines() {
        assert!(matches!(parse_reply(r#"{"url": "x"}"#), Attempt::TryNext(_)));
        assert!(matches!(parse_reply(r#"{"searchUrl": "  "}"#), Attempt::TryNext(_)));
    }

    #[tokio::test]
    async fn failing_oracle_declines_after_one_call() {
        let completer = Arc::new(MockCompleter::failing("connection refused"));
        let strategy = OracleStrategy::new(completer.clone());

        let attempt = strategy
            .attempt(
                &free_text_criteria("CEOs at cosmetics companies in Taiwan"),
                QueryMode::FreeTextParsed,
            )
            .await;

        assert!(matches!(
            attempt,
            Attempt::TryNext(reason) if reason.contains("connection refused")
        ));
        assert_eq!(completer.prompts().len(), 1);
    }
}
