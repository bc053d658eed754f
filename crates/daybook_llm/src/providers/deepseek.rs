//! DeepSeek provider (OpenAI-compatible chat completions API).

use crate::retry::{send_with_backoff, RetryPolicy};
use crate::{ChatMessage, ChatRole, CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DeepSeekClient {
    /// Reads `DEEPSEEK_API_KEY` from the environment; fails fast when missing
    /// so a misconfigured scheduled run dies before touching any state.
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key =
            env::var("DEEPSEEK_API_KEY").context("DEEPSEEK_API_KEY is required in environment")?;
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("DEEPSEEK_BASE_URL").ok())
            .unwrap_or_else(|| "https://api.deepseek.com".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            api_key,
            base_url,
            model: model.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for DeepSeekClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
        params: CompletionParams,
    ) -> Result<String> {
        // System prompt goes first with role "system" (OpenAI convention).
        let mut api_messages = vec![json!({
            "role": "system",
            "content": system,
        })];
        for msg in &messages {
            let role = match msg.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            api_messages.push(json!({
                "role": role,
                "content": msg.content,
            }));
        }

        let payload = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "stream": false,
        });

        tracing::debug!(
            "LLM params: max_tokens={}, temperature={:.2}",
            params.max_tokens,
            params.temperature
        );

        let url = format!("{}/v1/chat/completions", self.base_url);
        let policy = RetryPolicy::default();
        let client = &self.client;
        let api_key = &self.api_key;

        let response = send_with_backoff(&policy, "DeepSeek", || async {
            let resp = client
                .post(&url)
                .header("Authorization", format!("Bearer {}", api_key))
                .json(&payload)
                .send()
                .await
                .context("Failed to send request to DeepSeek")?;
            Ok(resp)
        })
        .await?;

        let resp_json: Value = response
            .json()
            .await
            .context("Failed to parse DeepSeek response")?;

        let text = resp_json["choices"][0]["message"]["content"]
            .as_str()
            .context("DeepSeek response missing choices[0].message.content")?
            .trim()
            .to_string();

        tracing::debug!(
            "DeepSeek reply (first 500 chars): {}",
            text.chars().take(500).collect::<String>()
        );

        Ok(text)
    }
}
