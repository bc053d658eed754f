//! Chat-completion client abstraction.
//!
//! The daily pipeline treats text generation as an opaque capability: a system
//! prompt, a user prompt, and sampling parameters in; a text blob (or a
//! failure) out. Providers live in [`providers`]; transient HTTP failures are
//! handled by the bounded policy in [`retry`].

pub mod providers;
pub mod retry;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters for one completion request.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// Maximum tokens to generate (clamped to provider limits).
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1600,
            temperature: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat completion request and return the reply text.
    async fn complete(
        &self,
        system: &str,
        messages: Vec<ChatMessage>,
        params: CompletionParams,
    ) -> Result<String>;
}
