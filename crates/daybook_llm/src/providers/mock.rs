//! Mock LLM provider: scripted deterministic responses for testing without
//! API keys. Responses are returned in order; the last one repeats.

use crate::{ChatMessage, CompletionParams, LlmClient};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    /// Number of `complete` calls made so far.
    calls: Mutex<u32>,
}

impl MockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: Vec<ChatMessage>,
        _params: CompletionParams,
    ) -> Result<String> {
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        *self.calls.lock().unwrap() += 1;

        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            *self.last.lock().unwrap() = Some(next.clone());
            return Ok(next);
        }
        if let Some(last) = self.last.lock().unwrap().clone() {
            return Ok(last);
        }
        anyhow::bail!("MockProvider has no scripted responses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_order_then_repeat() {
        let provider = MockProvider::new(vec!["one".into(), "two".into()]);
        let p = CompletionParams::default();
        assert_eq!(
            provider.complete("s", vec![], p.clone()).await.unwrap(),
            "one"
        );
        assert_eq!(
            provider.complete("s", vec![], p.clone()).await.unwrap(),
            "two"
        );
        assert_eq!(provider.complete("s", vec![], p).await.unwrap(), "two");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_errors() {
        let provider = MockProvider::new(vec![]);
        let result = provider
            .complete("s", vec![], CompletionParams::default())
            .await;
        assert!(result.is_err());
    }
}
