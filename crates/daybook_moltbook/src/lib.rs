//! Moltbook posting client.
//!
//! Best-effort outbound adapter: the daily pipeline persists its state first
//! and only then forwards the public excerpt here. A posting failure is
//! logged by the caller, never fatal, and never rolls anything back.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

const POST_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(1500);
/// 429 means a cooldown window; wait noticeably longer before the next try.
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MoltbookClient {
    client: Client,
    api_key: String,
    base_url: String,
    submolt: String,
}

impl MoltbookClient {
    /// Reads `MOLTBOOK_KEY` from the environment; fails fast when missing.
    pub fn new(base_url: &str, submolt: &str) -> Result<Self> {
        let api_key =
            env::var("MOLTBOOK_KEY").context("MOLTBOOK_KEY is required in environment")?;
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            submolt: submolt.to_string(),
        })
    }

    /// Submit one post. Bounded attempts with a fixed delay; a 429 gets a
    /// longer cooldown. Returns the API response body on success.
    #[tracing::instrument(skip(self, content), fields(submolt = %self.submolt))]
    pub async fn post(&self, title: &str, content: &str) -> Result<Value> {
        let url = format!("{}/api/v1/posts", self.base_url);
        let payload = json!({
            "submolt": self.submolt,
            "title": title,
            "content": content,
        });

        let mut last_err = String::new();
        for attempt in 1..=POST_ATTEMPTS {
            let result = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let body: Value = resp.json().await.unwrap_or(Value::Null);
                    tracing::info!("Posted to Moltbook on attempt {}", attempt);
                    return Ok(body);
                }
                Ok(resp) if resp.status().as_u16() == 429 => {
                    last_err = format!(
                        "rate limited: {}",
                        resp.text().await.unwrap_or_default().chars().take(300).collect::<String>()
                    );
                    tracing::warn!(
                        "Moltbook rate limit on attempt {}/{}",
                        attempt,
                        POST_ATTEMPTS
                    );
                    if attempt < POST_ATTEMPTS {
                        tokio::time::sleep(RATE_LIMIT_DELAY).await;
                    }
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_err = format!(
                        "HTTP {}: {}",
                        status,
                        resp.text().await.unwrap_or_default().chars().take(500).collect::<String>()
                    );
                    tracing::warn!(
                        "Moltbook post failed on attempt {}/{}: {}",
                        attempt,
                        POST_ATTEMPTS,
                        last_err
                    );
                    if attempt < POST_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
                Err(e) => {
                    last_err = e.to_string();
                    tracing::warn!(
                        "Moltbook network error on attempt {}/{}: {}",
                        attempt,
                        POST_ATTEMPTS,
                        last_err
                    );
                    if attempt < POST_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        anyhow::bail!("Moltbook post failed after {POST_ATTEMPTS} attempts: {last_err}")
    }
}
