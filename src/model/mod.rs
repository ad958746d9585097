mod claude;
mod deepseek;
mod mock;
mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use claude::ClaudeProvider;
pub use deepseek::{DEFAULT_DEEPSEEK_TIMEOUT, DeepSeekProvider};
pub use mock::MockModelProvider;
pub use openai::OpenAiProvider;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 200;

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Where a provider is reached and which key and model it uses.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl ProviderSettings {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for {0}")]
    MissingCredential(&'static str),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Unexpected(String),
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name used in failure replies.
    fn label(&self) -> &'static str;

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError>;

    /// Text sent back to the caller in place of a completion.
    fn describe_error(&self, error: &ProviderError) -> String {
        format!("{} error: {error}", self.label())
    }
}
